//! Contract fixture loader and canonical seed identities.

use std::path::Path;

use medworld_domain::role::Role;
use serde_json::Value;

/// Load a JSON golden file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use medworld_testing::fixture::Fixture;
/// let val = Fixture::load("contracts/http/api/login_ok.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Load and parse a fixture JSON file at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let workspace_root = std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| {
                // Walk up from crate dir to workspace root
                let p = Path::new(&dir);
                p.ancestors()
                    .find(|a| a.join("Cargo.lock").exists())
                    .unwrap_or(p)
                    .to_path_buf()
            })
            .unwrap_or_else(|_| std::env::current_dir().unwrap());

        let full_path = workspace_root.join(relative_path);
        let contents = std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e));
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {}: {}", relative_path, e))
    }
}

/// A well-known identity shared by seeds, tests, and the contract harness.
pub struct SeedUser {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub phone_number: &'static str,
    pub address: &'static str,
    pub gender: &'static str,
    pub date_of_birth: &'static str,
    pub role: Role,
}

impl SeedUser {
    /// The registration request body for this identity.
    pub fn register_body(&self) -> Value {
        serde_json::json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "password": self.password,
            "password_confirmation": self.password,
            "phone_number": self.phone_number,
            "address": self.address,
            "gender": self.gender,
            "date_of_birth": self.date_of_birth,
            "type": self.role,
        })
    }

    /// The login request body for this identity.
    pub fn login_body(&self) -> Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

/// The clinic's superadmin account.
pub fn superadmin() -> SeedUser {
    SeedUser {
        first_name: "Houria",
        last_name: "Aichi",
        email: "houria.aichi@medworld.dz",
        password: "password123",
        phone_number: "+213 555 222 000",
        address: "Algiers, Algeria",
        gender: "female",
        date_of_birth: "1985-06-15",
        role: Role::Superadmin,
    }
}

/// An admin account used by management scenarios.
pub fn sample_admin() -> SeedUser {
    SeedUser {
        first_name: "Yacine",
        last_name: "Brahimi",
        email: "yacine.brahimi@medworld.dz",
        password: "password123",
        phone_number: "+213 555 444 111",
        address: "Constantine",
        gender: "male",
        date_of_birth: "1988-09-12",
        role: Role::Admin,
    }
}

/// A doctor account used by role-gate scenarios.
pub fn sample_doctor() -> SeedUser {
    SeedUser {
        first_name: "Kamel",
        last_name: "Daoud",
        email: "kamel.daoud@medworld.dz",
        password: "password123",
        phone_number: "+213 555 123 456",
        address: "Algiers",
        gender: "male",
        date_of_birth: "1978-03-02",
        role: Role::Doctor,
    }
}

/// A patient account used by role-gate scenarios.
pub fn sample_patient() -> SeedUser {
    SeedUser {
        first_name: "Amina",
        last_name: "Benali",
        email: "amina.benali@medworld.dz",
        password: "password123",
        phone_number: "+213 555 987 654",
        address: "Oran",
        gender: "female",
        date_of_birth: "1992-11-30",
        role: Role::Patient,
    }
}
