use thiserror::Error;

/// Errors surfaced to callers of the search engine.
///
/// Failures of an in-flight search are not reported through this type; they
/// become the terminal `error` state of the affected session instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
	/// The backend could not accept a request.
	#[error("search backend unavailable: {0}")]
	BackendUnavailable(String),

	/// Input was rejected before reaching the backend.
	#[error("invalid input: {0}")]
	Validation(String),

	/// The referenced search, history entry or saved search does not exist.
	#[error("{kind} '{id}' not found")]
	NotFound { kind: &'static str, id: String },
}

impl EngineError {
	pub fn validation(reason: impl Into<String>) -> Self {
		Self::Validation(reason.into())
	}

	pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
		Self::NotFound {
			kind,
			id: id.into(),
		}
	}
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_missing_entity() {
		let err = EngineError::not_found("saved search", "abc");
		assert_eq!(err.to_string(), "saved search 'abc' not found");
	}
}
