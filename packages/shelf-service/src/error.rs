pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Duplicate sibling: {message}")]
	DuplicateSibling { message: String },
	#[error("Has children: {message}")]
	HasChildren { message: String },
	#[error("Has things: {message}")]
	HasThings { message: String },
	#[error("Invalid move target: {message}")]
	InvalidMoveTarget { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Vector store error: {message}")]
	VectorStore { message: String },
}
impl From<shelf_storage::Error> for Error {
	fn from(err: shelf_storage::Error) -> Self {
		match err {
			shelf_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			shelf_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			shelf_storage::Error::NotFound(message) => Self::NotFound { message },
			shelf_storage::Error::Conflict(message) => Self::DuplicateSibling { message },
			shelf_storage::Error::Qdrant(inner) => Self::VectorStore { message: inner.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
