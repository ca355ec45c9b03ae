//! Gateway identity and capability enforcement.
//!
//! The service sits behind a gateway that authenticates staff and
//! forwards identity as headers. x-user-id and x-user-role are only
//! trusted because the gateway strips them from outside traffic.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use service_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Named permission checked at the route boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    StationView,
    StationManage,
    TaxView,
    TaxManage,
    ReminderView,
    ReminderManage,
    SettingsManage,
    NotificationSend,
    ExtractionRun,
    ReportView,
    AuditView,
    JobTrigger,
}

/// Staff role asserted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }

    /// Capabilities granted to this role. Viewers get the read
    /// surfaces; everything else is admin-only.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::StationView,
                Capability::StationManage,
                Capability::TaxView,
                Capability::TaxManage,
                Capability::ReminderView,
                Capability::ReminderManage,
                Capability::SettingsManage,
                Capability::NotificationSend,
                Capability::ExtractionRun,
                Capability::ReportView,
                Capability::AuditView,
                Capability::JobTrigger,
            ],
            Role::Viewer => &[
                Capability::StationView,
                Capability::TaxView,
                Capability::ReminderView,
                Capability::ReportView,
            ],
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Identity materialized from the gateway headers, available to
/// handlers as a request extension.
#[derive(Debug, Clone)]
pub struct RequestUser {
    pub user_id: String,
    pub role: Role,
    pub name: Option<String>,
}

impl RequestUser {
    /// Display name recorded in the audit trail.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("사용자")
    }
}

/// Materializes [`RequestUser`] from the gateway headers. Requests
/// without an identity are rejected before any handler runs.
pub async fn identity_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing {} header", USER_ID_HEADER)))?;

    let role_value = req
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Missing {} header", USER_ROLE_HEADER))
        })?;

    let role = Role::parse(role_value)
        .ok_or_else(|| AppError::Forbidden(anyhow::anyhow!("Unknown role: {}", role_value)))?;

    // Header values are latin-1; names with multibyte characters come
    // through percent-encoded or not at all, so a failed to_str just
    // drops the name.
    let name = req
        .headers()
        .get(USER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    tracing::Span::current().record("user_id", user_id.as_str());

    req.extensions_mut().insert(RequestUser {
        user_id,
        role,
        name,
    });

    Ok(next.run(req).await)
}

/// Route-group guard. Attached with `from_fn_with_state(capability, ..)`
/// so every protected surface goes through the same check.
pub async fn require_capability(
    State(capability): State<Capability>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<RequestUser>()
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing request identity")))?;

    if !user.role.has(capability) {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Role {} lacks {:?}",
            user.role.as_str(),
            capability
        )));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_viewer_is_read_only() {
        let viewer = Role::Viewer;
        assert!(viewer.has(Capability::TaxView));
        assert!(viewer.has(Capability::StationView));
        assert!(viewer.has(Capability::ReminderView));
        assert!(viewer.has(Capability::ReportView));

        assert!(!viewer.has(Capability::TaxManage));
        assert!(!viewer.has(Capability::SettingsManage));
        assert!(!viewer.has(Capability::NotificationSend));
        assert!(!viewer.has(Capability::ExtractionRun));
        assert!(!viewer.has(Capability::AuditView));
        assert!(!viewer.has(Capability::JobTrigger));
    }

    #[test]
    fn test_admin_has_everything() {
        for capability in Role::Admin.capabilities() {
            assert!(Role::Admin.has(*capability));
        }
        assert_eq!(Role::Admin.capabilities().len(), 12);
    }

    #[test]
    fn test_display_name_falls_back() {
        let user = RequestUser {
            user_id: "u-1".to_string(),
            role: Role::Admin,
            name: None,
        };
        assert_eq!(user.display_name(), "사용자");

        let named = RequestUser {
            name: Some("Kim".to_string()),
            ..user
        };
        assert_eq!(named.display_name(), "Kim");
    }
}
