use std::collections::HashMap;
use std::sync::mpsc::Receiver;

pub type Permission = String;

/// Grant status per permission, as reported by the OS prompt.
pub type PermissionResults = HashMap<Permission, bool>;

pub trait DevicePermissions: Send + Sync {
    /// Permissions the application manifest declares.
    fn requested_permissions(
        &self,
    ) -> Result<Vec<Permission>, Box<dyn std::error::Error + Send + Sync>>;

    fn is_granted(&self, permission: &str) -> bool;

    /// Shows one OS prompt for every permission given. The results arrive
    /// on the returned receiver once the user answers.
    fn request(&self, permissions: &[Permission], request_code: u32) -> Receiver<PermissionResults>;
}
