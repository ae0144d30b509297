use eventdesk_application::{AuthorizationService, EventService, ProfileService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Token evaluation and request gating.
    pub authorization_service: AuthorizationService,
    /// Event CRUD behind the gate.
    pub event_service: EventService,
    /// Account profile updates behind the gate.
    pub profile_service: ProfileService,
    /// Origin allowed to call this API with credentials.
    pub frontend_url: String,
}
