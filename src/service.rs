//! File-generation orchestrator.
//!
//! Validates and coerces file names, dispatches to the matching builder,
//! persists the result through the [`GeneratedFileStore`] seam and returns a
//! retrieval URL. Builders run synchronously; only the persistence call is
//! awaited. The service holds no mutable state, so calls for different chats
//! run safely in parallel.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::content_type::{
    content_type_for_extension, ensure_extension, extension_of, is_text_extension,
};
use crate::docx::DocxBuilder;
use crate::error::{Error, Result};
use crate::model::{ContentEncoding, GeneratedFile};
use crate::pdf::PdfBuilder;
use crate::pptx::{parse_slides, PptxBuilder, PptxTemplateEngine};
use crate::tabular::parse_table_data;
use crate::xlsx::XlsxBuilder;

/// Persistence seam for generated files.
///
/// `create` returns the stored record; the store may substitute its own
/// stable id. Store failures pass through the service unmodified — no retry
/// happens here.
#[async_trait]
pub trait GeneratedFileStore: Send + Sync {
    /// Persist a record, returning it with its stable id.
    async fn create(&self, file: GeneratedFile) -> Result<GeneratedFile>;
}

/// Scheme, host and path base of the current request, used to build absolute
/// download URLs. Absent outside a request context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// URL scheme, e.g. `https`.
    pub scheme: String,
    /// Host, e.g. `assistent.example.no`.
    pub host: String,
    /// Path base the app is mounted under; empty for the root.
    pub path_base: String,
}

/// Orchestrates generation, persistence and URL construction.
pub struct FileGenerationService {
    store: Arc<dyn GeneratedFileStore>,
    template: Option<PptxTemplateEngine>,
}

impl FileGenerationService {
    /// Create a service over a store. Presentations use the generic builder
    /// until a corporate template is configured.
    pub fn new(store: Arc<dyn GeneratedFileStore>) -> Self {
        Self {
            store,
            template: None,
        }
    }

    /// Use a corporate template for PowerPoint generation.
    pub fn with_template(mut self, engine: PptxTemplateEngine) -> Self {
        self.template = Some(engine);
        self
    }

    /// Persist a plain-text file.
    ///
    /// Only md, txt, html, json, xml and csv extensions are accepted; a name
    /// without an extension becomes `.txt`.
    pub async fn create_text_file(
        &self,
        file_name: &str,
        content: &str,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = match extension_of(file_name) {
            Some(ext) if is_text_extension(ext) => file_name.to_string(),
            Some(ext) => {
                return Err(Error::UnsupportedTextExtension {
                    extension: ext.to_ascii_lowercase(),
                })
            }
            None => ensure_extension(file_name, "txt"),
        };

        let extension = extension_of(&file_name).unwrap_or("txt");
        let record = GeneratedFile::new(
            chat_id,
            user_id,
            &file_name,
            content_type_for_extension(extension),
            content.to_string(),
            ContentEncoding::Text,
            content.len() as u64,
        );
        self.persist(record, request).await
    }

    /// Build and persist a Word document from plain text.
    pub async fn create_word_file(
        &self,
        file_name: &str,
        content: &str,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = ensure_extension(file_name, "docx");
        let bytes = DocxBuilder::build(content)?;
        self.create_binary_file(&file_name, &BASE64.encode(bytes), chat_id, user_id, request)
            .await
    }

    /// Build and persist an Excel workbook from CSV or JSON tabular data.
    pub async fn create_excel_file(
        &self,
        file_name: &str,
        table_data: &str,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = ensure_extension(file_name, "xlsx");
        let rows = parse_table_data(table_data);
        let bytes = XlsxBuilder::build(&rows)?;
        self.create_binary_file(&file_name, &BASE64.encode(bytes), chat_id, user_id, request)
            .await
    }

    /// Build and persist a PowerPoint deck from slide-list JSON.
    ///
    /// Uses the corporate template when one is configured, the generic
    /// builder otherwise. Slide parsing never fails; malformed payloads
    /// degrade to a single slide.
    pub async fn create_power_point_file(
        &self,
        file_name: &str,
        slides_json: &str,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = ensure_extension(file_name, "pptx");
        let slides = parse_slides(slides_json).into_slides();
        debug!(slides = slides.len(), "building presentation");

        let bytes = match &self.template {
            Some(engine) => engine.build(&slides)?,
            None => PptxBuilder::build(&slides)?,
        };
        self.create_binary_file(&file_name, &BASE64.encode(bytes), chat_id, user_id, request)
            .await
    }

    /// Build and persist a PDF from content text and an optional title.
    pub async fn create_pdf_file(
        &self,
        file_name: &str,
        content: &str,
        title: Option<&str>,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = ensure_extension(file_name, "pdf");
        let bytes = PdfBuilder::build(content, title)?;
        self.create_binary_file(&file_name, &BASE64.encode(bytes), chat_id, user_id, request)
            .await
    }

    /// Persist a pre-built binary from a base64 payload.
    ///
    /// Invalid base64 is a hard error. The content type comes from the
    /// (possibly coerced) extension; unknown extensions fall back to
    /// `application/octet-stream`.
    pub async fn create_binary_file(
        &self,
        file_name: &str,
        base64_content: &str,
        chat_id: &str,
        user_id: &str,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let decoded = BASE64.decode(base64_content)?;

        let content_type = extension_of(file_name)
            .map(content_type_for_extension)
            .unwrap_or(crate::content_type::OCTET_STREAM);

        let record = GeneratedFile::new(
            chat_id,
            user_id,
            file_name,
            content_type,
            base64_content.to_string(),
            ContentEncoding::Base64,
            decoded.len() as u64,
        );
        self.persist(record, request).await
    }

    /// Persist the record and build its retrieval URL.
    async fn persist(
        &self,
        record: GeneratedFile,
        request: Option<&RequestContext>,
    ) -> Result<String> {
        let file_name = record.file_name.clone();
        let size = record.size;

        let stored = self.store.create(record).await?;
        info!(
            chat_id = %stored.chat_id,
            file = %file_name,
            size,
            "generated file persisted"
        );

        Ok(download_url(request, stored.id))
    }
}

/// Build the download URL for a stored file. Falls back to a relative path
/// when no request context is available.
fn download_url(request: Option<&RequestContext>, id: Uuid) -> String {
    match request {
        Some(ctx) => {
            let path_base = ctx.path_base.trim_end_matches('/');
            format!("{}://{}{}/files/{}", ctx.scheme, ctx.host, path_base, id)
        }
        None => format!("/files/{id}"),
    }
}
