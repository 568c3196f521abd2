use crate::config::NamingStrategy;
use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

/// Default length of generated staging names
pub const DEFAULT_NAME_LENGTH: usize = 10;

/// Generates a string of `length` characters drawn uniformly from `[A-Za-z0-9]`.
///
/// No uniqueness check is done here; callers that need one (the stager) must
/// detect collisions when writing.
pub fn generate_random_name(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Produces the stem of a staged file name according to the configured strategy
pub fn generate_stem(strategy: NamingStrategy, length: usize) -> String {
    match strategy {
        NamingStrategy::Random => generate_random_name(length),
        NamingStrategy::Uuid => Uuid::new_v4().simple().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_name_length_and_alphabet() {
        for len in [0, 1, DEFAULT_NAME_LENGTH, 64] {
            let name = generate_random_name(len);
            assert_eq!(name.len(), len);
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_random_names_do_not_collide() {
        let names: HashSet<String> = (0..10_000)
            .map(|_| generate_random_name(DEFAULT_NAME_LENGTH))
            .collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn test_uuid_stem() {
        let stem = generate_stem(NamingStrategy::Uuid, DEFAULT_NAME_LENGTH);
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
