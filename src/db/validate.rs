//! Insert-time shape checks for resources.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewResource, ResourceKind};

/// A resource that would break the catalog's structural invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("resource name must not be empty")]
    EmptyName,

    #[error("category '{0}' must not have a url")]
    CategoryWithUrl(String),

    #[error("{kind} '{name}' requires a url")]
    MissingUrl { name: String, kind: ResourceKind },

    #[error("only simulations may have an image url ('{0}')")]
    ImageOnNonSimulation(String),

    #[error("parent resource {0} not found")]
    ParentNotFound(Uuid),

    #[error("parent resource {0} is not a category")]
    ParentNotCategory(Uuid),
}

/// Checks that need no store access. Parent checks happen in the insert itself.
pub fn validate_shape(input: &NewResource) -> Result<(), ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let has_url = input.url.as_deref().is_some_and(|u| !u.trim().is_empty());
    match input.kind {
        ResourceKind::Category if input.url.is_some() => {
            return Err(ValidationError::CategoryWithUrl(input.name.clone()));
        }
        kind if kind.is_leaf() && !has_url => {
            return Err(ValidationError::MissingUrl {
                name: input.name.clone(),
                kind,
            });
        }
        _ => {}
    }

    if input.image_url.is_some() && input.kind != ResourceKind::Simulation {
        return Err(ValidationError::ImageOnNonSimulation(input.name.clone()));
    }

    Ok(())
}
