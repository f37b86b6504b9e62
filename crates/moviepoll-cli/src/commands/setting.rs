//! Setting command handlers

use anyhow::{anyhow, Context, Result};

use moviepoll_core::{DataConnector, SettingKind, SettingValue, Store};

use crate::output::Output;

/// Show a setting, optionally coerced to `kind`
pub fn get(store: &Store, key: String, kind: Option<SettingKind>, output: &Output) -> Result<()> {
    let value = match kind {
        None => store
            .settings()
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("Setting {:?} is not set", key))?,
        Some(SettingKind::String) => SettingValue::String(store.get_cfg_string(&key, "")?),
        Some(SettingKind::Int) => SettingValue::Int(store.get_cfg_int(&key, 0)?),
        Some(SettingKind::Bool) => SettingValue::Bool(store.get_cfg_bool(&key, false)?),
    };

    output.print_setting(&key, &value);
    Ok(())
}

/// List every setting
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let settings = store.settings();
    if settings.is_empty() {
        output.message("No settings.");
    }
    for (key, value) in settings.iter() {
        output.print_setting(key, value);
    }
    Ok(())
}

/// Store a setting with an explicit kind
pub fn set(store: &Store, key: String, value: String, kind: SettingKind, output: &Output) -> Result<()> {
    let parsed = SettingValue::parse_as(kind, &value)
        .ok_or_else(|| anyhow!("{:?} is not a valid {}", value, kind))?;

    store
        .set_setting(&key, parsed)
        .with_context(|| format!("Failed to update setting {:?}", key))?;

    output.success(&format!("Set {} = {} ({})", key, value, kind));
    Ok(())
}

/// Delete a setting
pub fn delete(store: &Store, key: String, output: &Output) -> Result<()> {
    store.delete_cfg_key(&key)?;
    output.success(&format!("Deleted {}", key));
    Ok(())
}
