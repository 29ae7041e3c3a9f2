//! Deterministic personnel names for synthetic directories.
//!
//! Same RNG seed = same names. Emails are derived from the name plus a
//! serial so they stay unique within one generated directory.

use crate::rng::DirectoryRng;

pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically
    pub fn generate_full_name(rng: &mut DirectoryRng) -> String {
        let first_name = Self::generate_first_name(rng);
        let last_name = Self::generate_last_name(rng);
        format!("{first_name} {last_name}")
    }

    pub fn generate_first_name(rng: &mut DirectoryRng) -> &'static str {
        rng.pick(Self::first_names()).copied().unwrap_or("Alex")
    }

    pub fn generate_last_name(rng: &mut DirectoryRng) -> &'static str {
        rng.pick(Self::last_names()).copied().unwrap_or("Morgan")
    }

    /// `first.last.serial@domain`, lowercased, ASCII letters only in the name part.
    pub fn email_for(full_name: &str, serial: usize, domain: &str) -> String {
        let local: Vec<String> = full_name
            .split_whitespace()
            .map(|part| {
                part.chars()
                    .filter(char::is_ascii_alphabetic)
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .filter(|p| !p.is_empty())
            .collect();
        format!("{}.{serial}@{domain}", local.join("."))
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Aarav", "Aditi", "Amara", "Ananya", "Arjun", "Beatriz", "Chen", "Daniel",
            "Deepa", "Elena", "Farah", "Gabriel", "Hana", "Ibrahim", "Isha", "James",
            "Kavya", "Kenji", "Lakshmi", "Leila", "Lucas", "Maria", "Meera", "Mohammed",
            "Nadia", "Naveen", "Olivia", "Omar", "Priya", "Rahul", "Ravi", "Rohan",
            "Sakura", "Samuel", "Sara", "Sofia", "Tariq", "Vikram", "Yusuf", "Zara",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Agarwal", "Ahmed", "Banerjee", "Bose", "Chopra", "Costa", "Das", "Fernandes",
            "Garcia", "Gupta", "Haddad", "Iyer", "Joshi", "Kapoor", "Khan", "Kim",
            "Kumar", "Lopez", "Mehta", "Menon", "Nair", "Nakamura", "Okafor", "Patel",
            "Pillai", "Rao", "Reddy", "Rossi", "Sato", "Shah", "Sharma", "Singh",
            "Smith", "Verma", "Wang", "Yadav",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::validate_email, rng::RngStream};

    #[test]
    fn names_are_deterministic() {
        let mut a = DirectoryRng::new(42, RngStream::Names);
        let mut b = DirectoryRng::new(42, RngStream::Names);
        for _ in 0..20 {
            assert_eq!(
                NameGenerator::generate_full_name(&mut a),
                NameGenerator::generate_full_name(&mut b)
            );
        }
    }

    #[test]
    fn generated_emails_validate() {
        let email = NameGenerator::email_for("Priya O'Neil-Shah", 17, "example.test");
        assert_eq!(email, "priya.oneilshah.17@example.test");
        assert!(validate_email(&email).is_ok());
    }
}
