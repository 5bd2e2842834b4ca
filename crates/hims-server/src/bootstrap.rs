//! Startup provisioning.

use hims_auth::{AuthError, AuthService, StaffRegistration, password::generate_password};
use hims_core::StaffRole;
use hims_storage::DynStorage;
use tracing::{info, warn};

use crate::config::AdminUserConfig;

/// What [`bootstrap_admin_user`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created { generated_password: bool },
    AlreadyExists,
}

/// Creates the configured admin account unless the username is taken.
pub async fn bootstrap_admin_user(
    storage: &DynStorage,
    auth: &AuthService,
    admin: &AdminUserConfig,
) -> Result<AdminBootstrap, AuthError> {
    let username = admin.username.trim();
    if let Some(existing) = storage.staff().find_credentials(username).await? {
        if existing.staff.role != StaffRole::Admin {
            warn!(username, role = %existing.staff.role, "Bootstrap admin username belongs to a non-admin account");
        } else {
            info!(username, "Admin user already exists");
        }
        return Ok(AdminBootstrap::AlreadyExists);
    }

    let (password, generated) = match admin.password {
        Some(ref p) => (p.clone(), false),
        None => (generate_password(), true),
    };

    let staff = auth
        .register_staff(StaffRegistration {
            username: username.to_string(),
            display_name: admin.display_name.clone(),
            email: admin.email.clone(),
            role: StaffRole::Admin,
            password: password.clone(),
        })
        .await?;

    if generated {
        warn!(
            username,
            password = %password,
            "Generated admin password; change it or set HIMS__BOOTSTRAP__ADMIN_USER__PASSWORD"
        );
    }
    info!(staff_id = %staff.id, username, "Admin user created");
    Ok(AdminBootstrap::Created {
        generated_password: generated,
    })
}
