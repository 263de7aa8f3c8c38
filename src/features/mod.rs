//! CRUD features. Each one is a repository trait with a SQLite
//! implementation, a service holding the rules, and axum handlers.

pub mod guru;
pub mod kelas;
pub mod login;
pub mod mapel;
pub mod siswa;
pub mod users;

/// Overwrite `current` with `incoming` unless it is blank.
pub(crate) fn keep_or_replace(current: &mut String, incoming: &str) {
    let incoming = incoming.trim();
    if !incoming.is_empty() {
        *current = incoming.to_string();
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Whether an update names a reference at all.
pub(crate) fn wants_reference(id: &str, name: &str) -> bool {
    !id.trim().is_empty() || !name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_or_replace() {
        let mut value = "lama".to_string();
        keep_or_replace(&mut value, "   ");
        assert_eq!(value, "lama");
        keep_or_replace(&mut value, " baru ");
        assert_eq!(value, "baru");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("k1".to_string()), Some("k1".to_string()));
        assert!(!wants_reference("", " "));
        assert!(wants_reference("", "Kelas A"));
    }
}
