use std::collections::HashMap;

use super::StoreError;

pub(crate) const SERVICE_NAME: &str = "petal-store";

/// Store the account credentials in the system keyring via Secret Service.
pub async fn store_credentials(
    server: &str,
    email: &str,
    password: &str,
) -> Result<(), StoreError> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to connect: {}", e)))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);

    let secret = format!("{}:{}", email, password);

    keyring
        .create_item(
            &format!("Petal account ({})", server),
            &attrs,
            secret.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to store credentials: {}", e)))?;

    Ok(())
}

/// Load the account credentials from the system keyring.
/// Returns (email, password) if found.
pub async fn load_credentials(server: &str) -> Result<Option<(String, String)>, StoreError> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to connect: {}", e)))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to search: {}", e)))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| StoreError::Keyring(format!("failed to read secret: {}", e)))?;
        let secret = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| StoreError::Keyring(format!("invalid UTF-8 in secret: {}", e)))?;
        if let Some((email, password)) = secret.split_once(':') {
            return Ok(Some((email.to_string(), password.to_string())));
        }
    }

    Ok(None)
}

/// Delete the account credentials from the system keyring.
pub async fn delete_credentials(server: &str) -> Result<(), StoreError> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to connect: {}", e)))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| StoreError::Keyring(format!("failed to search: {}", e)))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| StoreError::Keyring(format!("failed to delete credential: {}", e)))?;
    }

    Ok(())
}
