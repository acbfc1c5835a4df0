// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Error types for template access, parameters and function resolution

use thiserror::Error;

use crate::path::TraversalError;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`], stable across message changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSection,
    InvalidArgument,
    UserParameterMissing,
    UnknownUserParameter,
    NotFound,
    InvalidStackIdentifier,
    InvalidTemplateReference,
    Traversal,
    InvalidSchema,
    InvalidParameter,
    InvalidTemplate,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Section name unknown to the dialect
    #[error("\"{section}\" is not a valid template section")]
    InvalidSection { section: String },

    /// Section that exists but must be read through a dedicated accessor
    #[error("Section {section} can not be accessed directly.")]
    SectionAccessDenied { section: String },

    /// Malformed intrinsic function arguments
    #[error("{message}")]
    InvalidArgument { fn_name: String, message: String },

    #[error("The Parameter ({key}) was not provided.")]
    UserParameterMissing { key: String },

    #[error("The Parameter ({key}) was not defined in template.")]
    UnknownUserParameter { key: String },

    #[error("No content found in the \"{section}\" section for {fn_name} path: {key}")]
    NotFound {
        fn_name: String,
        section: String,
        key: String,
    },

    #[error("The Stack identifier is invalid")]
    InvalidStackIdentifier,

    #[error("The specified reference \"{resource}\" (in {key}) is incorrect.")]
    InvalidTemplateReference { resource: String, key: String },

    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("{message}")]
    InvalidSchema { message: String },

    #[error("Parameter '{key}' is invalid: {message}")]
    InvalidParameter { key: String, message: String },

    #[error("{message}")]
    InvalidTemplate { message: String },
}

impl Error {
    pub fn invalid_argument(fn_name: &str, message: impl Into<String>) -> Error {
        Error::InvalidArgument {
            fn_name: fn_name.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn invalid_template(message: impl Into<String>) -> Error {
        Error::InvalidTemplate {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSection { .. } | Error::SectionAccessDenied { .. } => ErrorKind::InvalidSection,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::UserParameterMissing { .. } => ErrorKind::UserParameterMissing,
            Error::UnknownUserParameter { .. } => ErrorKind::UnknownUserParameter,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidStackIdentifier => ErrorKind::InvalidStackIdentifier,
            Error::InvalidTemplateReference { .. } => ErrorKind::InvalidTemplateReference,
            Error::Traversal(_) => ErrorKind::Traversal,
            Error::InvalidSchema { .. } => ErrorKind::InvalidSchema,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Error::InvalidTemplate { .. } => ErrorKind::InvalidTemplate,
        }
    }
}
