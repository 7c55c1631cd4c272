//! Host fields offered for a reveal session.
//!
//! The host supplies a record's fields in source order through
//! [`FieldSource`]. [`FieldSet::collect`] drops empty values and whatever
//! the caller's predicate rejects, then orders the rest for display:
//! the password first, the user name second, everything else in source
//! order.

use secrecy::ExposeSecret;
use tracing::debug;

use crate::secret::SecretField;
use crate::traits::FieldSource;

/// Host key of the password field.
pub const PASSWORD_KEY: &str = "Password";

/// Host key of the user name field.
pub const USERNAME_KEY: &str = "UserName";

/// The ordered fields of one record.
#[derive(Debug, Default)]
pub struct FieldSet {
    fields: Vec<SecretField>,
}

impl FieldSet {
    /// Build the field set of a record.
    ///
    /// `accept` receives each host key and returns whether the field should
    /// be offered; typically it rejects structural keys such as titles or
    /// URLs. Fields with empty values are always skipped. With `seal` set
    /// every value is encrypted in memory.
    pub fn collect<S, F>(source: &S, accept: F, seal: bool) -> Self
    where
        S: FieldSource + ?Sized,
        F: Fn(&str) -> bool,
    {
        let mut standard = Vec::new();
        let mut custom = Vec::new();
        let mut skipped = 0usize;

        for host in source.fields() {
            if host.value.expose_secret().is_empty() || !accept(&host.key) {
                skipped += 1;
                continue;
            }

            // Only the exact host keys are standard; "password" is a custom field
            if host.key == PASSWORD_KEY {
                let field = SecretField::new("Password", host.value, host.protected, seal);
                standard.insert(0, field);
            } else if host.key == USERNAME_KEY {
                let field = SecretField::new("User Name", host.value, host.protected, seal);
                standard.push(field);
            } else {
                custom.push(SecretField::new(host.key, host.value, host.protected, seal));
            }
        }

        standard.extend(custom);
        debug!(offered = standard.len(), skipped, "Collected record fields");
        Self { fields: standard }
    }

    /// Wrap fields that are already in display order.
    pub fn from_fields(fields: Vec<SecretField>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there is nothing to offer.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field at `index` in display order.
    pub fn get(&self, index: usize) -> Option<&SecretField> {
        self.fields.get(index)
    }

    /// Find a field by display name.
    ///
    /// An exact match wins; otherwise the first case-insensitive match.
    pub fn find(&self, name: &str) -> Option<&SecretField> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|f| f.name().eq_ignore_ascii_case(name))
            })
    }

    /// Fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SecretField> + '_ {
        self.fields.iter()
    }

    /// Display names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(SecretField::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostField;

    fn record() -> Vec<HostField> {
        vec![
            HostField::new("Title", "Bank", false),
            HostField::new("UserName", "alice", false),
            HostField::new("memorable word", "otter", true),
            HostField::new("URL", "https://bank.example", false),
            HostField::new("Password", "Tr0ub4dor&3", true),
            HostField::new("Notes", "", false),
            HostField::new("PIN", "4321", true),
        ]
    }

    fn not_structural(key: &str) -> bool {
        !["Title", "URL", "Notes"].contains(&key)
    }

    #[test]
    fn orders_password_then_username_then_source_order() {
        let set = FieldSet::collect(&record(), not_structural, true);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["Password", "User Name", "memorable word", "PIN"]);
    }

    #[test]
    fn predicate_and_empty_values_filter_fields() {
        let set = FieldSet::collect(&record(), |_| true, false);
        let names: Vec<&str> = set.names().collect();
        // Notes is empty and dropped even though the predicate accepts it
        assert_eq!(
            names,
            vec!["Password", "User Name", "Title", "memorable word", "URL", "PIN"]
        );
    }

    #[test]
    fn keeps_protection_flag_and_seal_choice() {
        let set = FieldSet::collect(&record(), not_structural, true);
        let password = set.find("password").unwrap();
        let user = set.find("User Name").unwrap();
        assert!(password.is_masked());
        assert!(!user.is_masked());
        assert!(password.is_sealed());
        assert!(user.is_sealed());
        assert_eq!(password.len(), 11);
    }

    #[test]
    fn other_spellings_of_standard_keys_stay_custom() {
        let source = vec![
            HostField::new("username", "bob", false),
            HostField::new("PASSWORD", "pw", true),
        ];
        let set = FieldSet::collect(&source, |_| true, false);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["username", "PASSWORD"]);
    }

    #[test]
    fn custom_password_key_does_not_displace_the_real_one() {
        let source = vec![
            HostField::new("Password", "Tr0ub4dor&3", true),
            HostField::new("password", "custom-value", false),
            HostField::new("UserName", "alice", false),
        ];
        let set = FieldSet::collect(&source, |_| true, true);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["Password", "User Name", "password"]);

        let password = set.find("Password").unwrap();
        assert_eq!(password.len(), 11);
        assert!(password.is_masked());

        let custom = set.find("password").unwrap();
        assert_eq!(custom.len(), 12);
        assert!(!custom.is_masked());
    }

    #[test]
    fn empty_record_gives_empty_set() {
        let set = FieldSet::collect(&Vec::<HostField>::new(), |_| true, true);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(set.get(0).is_none());
        assert!(set.find("Password").is_none());
    }
}
