use std::fmt;

use super::PathRole;

/// Failure to resolve the resource root or a role's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The root environment variable is not set.
    EnvVarMissing { var: String },
    /// The root environment variable is set but is not valid Unicode.
    EnvVarNotUnicode { var: String },
    /// The root resolved to an empty string.
    EmptyRoot,
    /// The tree has not been initialized yet.
    NotInitialized,
    /// The role has no path registered.
    RoleUnresolved(PathRole),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::EnvVarMissing { var } => {
                write!(f, "the environment variable {var} was not found")
            }
            PathError::EnvVarNotUnicode { var } => {
                write!(f, "the environment variable {var} is not valid unicode")
            }
            PathError::EmptyRoot => f.write_str("resource root path is empty"),
            PathError::NotInitialized => f.write_str("resource tree is not initialized"),
            PathError::RoleUnresolved(role) => write!(f, "path for {role} does not exist"),
        }
    }
}

impl std::error::Error for PathError {}
