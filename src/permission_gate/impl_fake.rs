use crate::permission_gate::interface::{DevicePermissions, Permission, PermissionResults};
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

pub struct DevicePermissionsFake {
    declared: Vec<Permission>,
    granted: Mutex<HashSet<Permission>>,
    grant_on_prompt: HashSet<Permission>,
    manifest_readable: bool,
    requests: Mutex<Vec<(Vec<Permission>, u32)>>,
}

impl DevicePermissionsFake {
    pub fn new(declared: Vec<&str>, granted: Vec<&str>) -> Self {
        Self {
            declared: declared.into_iter().map(String::from).collect(),
            granted: Mutex::new(granted.into_iter().map(String::from).collect()),
            grant_on_prompt: HashSet::new(),
            manifest_readable: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Permissions the fake user accepts when prompted.
    pub fn answering(mut self, grant_on_prompt: Vec<&str>) -> Self {
        self.grant_on_prompt = grant_on_prompt.into_iter().map(String::from).collect();
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.manifest_readable = false;
        self
    }

    pub fn requests(&self) -> Vec<(Vec<Permission>, u32)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl DevicePermissions for DevicePermissionsFake {
    fn requested_permissions(
        &self,
    ) -> Result<Vec<Permission>, Box<dyn std::error::Error + Send + Sync>> {
        if !self.manifest_readable {
            return Err("package info not found".into());
        }
        Ok(self.declared.clone())
    }

    fn is_granted(&self, permission: &str) -> bool {
        self.granted
            .lock()
            .map(|granted| granted.contains(permission))
            .unwrap_or(false)
    }

    fn request(&self, permissions: &[Permission], request_code: u32) -> Receiver<PermissionResults> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((permissions.to_vec(), request_code));
        }

        let results: PermissionResults = permissions
            .iter()
            .map(|permission| {
                (
                    permission.clone(),
                    self.grant_on_prompt.contains(permission),
                )
            })
            .collect();

        if let Ok(mut granted) = self.granted.lock() {
            granted.extend(
                results
                    .iter()
                    .filter(|(_, ok)| **ok)
                    .map(|(permission, _)| permission.clone()),
            );
        }

        let (tx, rx) = channel();
        let _ = tx.send(results);
        rx
    }
}
