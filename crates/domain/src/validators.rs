/// Longest domain a corpus entry may carry, in bytes.
pub const MAX_DOMAIN_LEN: usize = 255;

pub fn validate_domain_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Domain name cannot be empty".to_string());
    }
    if name.len() > MAX_DOMAIN_LEN {
        return Err(format!("Domain name cannot exceed {MAX_DOMAIN_LEN} bytes"));
    }
    Ok(())
}
