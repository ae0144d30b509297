//! Application services and ports for the Eventdesk portal.

#![forbid(unsafe_code)]

mod authorization_service;
mod claims;
mod event_key;
mod event_ports;
mod event_service;
mod identity_ports;
mod profile_service;

pub use authorization_service::{AuthorizationService, AuthorizedCaller};
pub use claims::{TokenClaims, decode_claims};
pub use event_ports::{
    EventFilter, EventPage, EventRepository, EventUpdate, ImageStore, ImageUpload, NewEvent,
};
pub use event_service::EventService;
pub use identity_ports::{GrantedPermission, IdentityProvider, ProfileUpdate, RoleSource};
pub use profile_service::{ProfileChange, ProfileService};
