use apiview_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ApiViewError
pub type Result<T> = std::result::Result<T, ApiViewError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and the CLI exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Boundary
    Argument,
    FileNotFound,
    DirectoryNotFound,

    // Analysis
    Compilation,

    // Addressing
    SectionNotFound,

    // Document
    InvalidDocument,
    Deserialization,
    Serialization,

    // Integration/IO
    Config,
    Io,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Argument => "ERR_ARGUMENT",
            ExErrorKind::FileNotFound => "ERR_FILE_NOT_FOUND",
            ExErrorKind::DirectoryNotFound => "ERR_DIRECTORY_NOT_FOUND",
            ExErrorKind::Compilation => "ERR_COMPILATION",
            ExErrorKind::SectionNotFound => "ERR_SECTION_NOT_FOUND",
            ExErrorKind::InvalidDocument => "ERR_INVALID_DOCUMENT",
            ExErrorKind::Deserialization => "ERR_DESERIALIZATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus context for
/// debugging. Every `ApiViewError` converts into one of these.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    section_key: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            section_key: None,
            path: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (library name, line id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add section key context
    pub fn with_section_key(mut self, key: impl Into<String>) -> Self {
        self.section_key = Some(key.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the section key context, if any
    pub fn section_key(&self) -> Option<&str> {
        self.section_key.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(key) = &self.section_key {
            write!(f, " (section_key: {})", key)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for surface building, rendering and persistence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiViewError {
    // ===== Boundary Errors =====
    /// Malformed CLI invocation
    #[error("Invalid arguments: {reason}")]
    Argument { reason: String },

    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Parent directory of an output path does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ===== Analysis Errors =====
    /// The library handle cannot be analyzed at all
    #[error("Library {library} cannot be analyzed: {reason}")]
    Compilation { library: String, reason: String },

    // ===== Addressing Errors =====
    /// Lookup of an unknown section key
    #[error("Section not found: {key}")]
    SectionNotFound { key: String },

    // ===== Document Errors =====
    /// Structural invariant of a CodeFile violated
    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },

    /// Corrupt or schema-mismatched persisted document
    #[error("Deserialization error: {message}")]
    Deserialization { message: String },

    /// Serialization error (JSON encoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // ===== Generic Errors =====
    /// Configuration file present but unreadable or malformed
    #[error("Invalid configuration {path}: {reason}")]
    Config { path: String, reason: String },

    /// Shared state poisoned by a panicking thread
    #[error("Concurrency error: {message}")]
    Concurrency { message: String },

    /// Filesystem or stream failure
    #[error("IO error during {op}: {message}")]
    Io { op: String, message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiViewError {
    /// Wrap a `std::io::Error` raised during `op`
    pub fn io(op: &str, err: std::io::Error) -> Self {
        ApiViewError::Io {
            op: op.to_string(),
            message: err.to_string(),
        }
    }

    /// Stable error kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ApiViewError::Argument { .. } => ExErrorKind::Argument,
            ApiViewError::FileNotFound { .. } => ExErrorKind::FileNotFound,
            ApiViewError::DirectoryNotFound { .. } => ExErrorKind::DirectoryNotFound,
            ApiViewError::Compilation { .. } => ExErrorKind::Compilation,
            ApiViewError::SectionNotFound { .. } => ExErrorKind::SectionNotFound,
            ApiViewError::InvalidDocument { .. } => ExErrorKind::InvalidDocument,
            ApiViewError::Deserialization { .. } => ExErrorKind::Deserialization,
            ApiViewError::Serialization { .. } => ExErrorKind::Serialization,
            ApiViewError::Config { .. } => ExErrorKind::Config,
            ApiViewError::Concurrency { .. } => ExErrorKind::Concurrency,
            ApiViewError::Io { .. } => ExErrorKind::Io,
            ApiViewError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from ApiViewError to ExError
impl From<ApiViewError> for ExError {
    fn from(err: ApiViewError) -> Self {
        let kind = err.kind();
        match err {
            ApiViewError::Argument { reason } => ExError::new(kind)
                .with_op("parse_args")
                .with_message(reason),

            ApiViewError::FileNotFound { path } => ExError::new(kind)
                .with_path(path)
                .with_message("Input file does not exist"),

            ApiViewError::DirectoryNotFound { path } => ExError::new(kind)
                .with_path(path)
                .with_message("Output directory does not exist"),

            ApiViewError::Compilation { library, reason } => ExError::new(kind)
                .with_op("build_surface")
                .with_entity_id(library)
                .with_message(reason),

            ApiViewError::SectionNotFound { key } => ExError::new(kind)
                .with_op("lines_for_section")
                .with_section_key(key)
                .with_message("Section not found"),

            ApiViewError::InvalidDocument { reason } => ExError::new(kind).with_message(reason),

            ApiViewError::Deserialization { message } => ExError::new(kind)
                .with_op("deserialize")
                .with_message(message),

            ApiViewError::Serialization { message } => ExError::new(kind)
                .with_op("serialize")
                .with_message(message),

            ApiViewError::Config { path, reason } => ExError::new(kind)
                .with_op("load_config")
                .with_path(path)
                .with_message(reason),

            ApiViewError::Concurrency { message } => ExError::new(kind).with_message(message),

            ApiViewError::Io { op, message } => {
                ExError::new(kind).with_op(op).with_message(message)
            }

            ApiViewError::Internal { message } => ExError::new(kind).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to ApiViewError
///
/// Encoding failures only; decoding paths map to `Deserialization`
/// explicitly at the call site.
impl From<serde_json::Error> for ApiViewError {
    fn from(err: serde_json::Error) -> Self {
        ApiViewError::Serialization {
            message: err.to_string(),
        }
    }
}
