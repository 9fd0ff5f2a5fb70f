use crate::library::logger::interface::Logger;
use crate::permission_gate::interface::{DevicePermissions, Permission, PermissionResults};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

pub const PERMISSION_REQUESTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    AllGranted,
    Requested(Vec<Permission>),
}

pub struct PermissionGate {
    permissions: Arc<dyn DevicePermissions + Send + Sync>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl PermissionGate {
    pub fn new(
        permissions: Arc<dyn DevicePermissions + Send + Sync>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            permissions,
            logger: logger.with_namespace("permission_gate"),
        }
    }

    /// Manifest permissions in declaration order without duplicates. An
    /// unreadable manifest counts as nothing required.
    pub fn required_permissions(&self) -> Vec<Permission> {
        match self.permissions.requested_permissions() {
            Ok(declared) => {
                let mut required: Vec<Permission> = Vec::with_capacity(declared.len());
                for permission in declared {
                    if !required.contains(&permission) {
                        required.push(permission);
                    }
                }
                required
            }
            Err(e) => {
                let _ = self
                    .logger
                    .error(&format!("Unable to read permission manifest: {}", e));
                vec![]
            }
        }
    }

    fn is_granted(&self, permission: &str) -> bool {
        let granted = self.permissions.is_granted(permission);
        let _ = if granted {
            self.logger
                .info(&format!("Permission granted: {}", permission))
        } else {
            self.logger
                .info(&format!("Permission NOT granted: {}", permission))
        };
        granted
    }

    /// Requests every missing permission in a single prompt. Returns the
    /// prompt receiver alongside the check so the caller can observe the answer.
    pub fn ensure(&self) -> (PermissionCheck, Option<Receiver<PermissionResults>>) {
        let missing: Vec<Permission> = self
            .required_permissions()
            .into_iter()
            .filter(|permission| !self.is_granted(permission))
            .collect();

        if missing.is_empty() {
            return (PermissionCheck::AllGranted, None);
        }

        let _ = self
            .logger
            .info(&format!("Requesting permissions: {:?}", missing));

        let results = self.permissions.request(&missing, PERMISSION_REQUESTS);

        (PermissionCheck::Requested(missing), Some(results))
    }

    /// Logs the prompt answer and returns the permissions still denied.
    /// Nothing downstream is gated on this.
    pub fn on_permissions_result(&self, results: &PermissionResults) -> Vec<Permission> {
        let mut denied: Vec<Permission> = results
            .iter()
            .filter(|(_, granted)| !**granted)
            .map(|(permission, _)| permission.clone())
            .collect();
        denied.sort();

        if denied.is_empty() {
            let _ = self.logger.info("All requested permissions granted");
        } else {
            let _ = self
                .logger
                .info(&format!("Permissions denied: {:?}", denied));
        }

        denied
    }
}
