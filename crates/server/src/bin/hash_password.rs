//! Hash a password for seeding accounts by hand:
//! `cargo run --bin hash-password -- <password>`

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

fn main() {
    let password = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: hash-password <password>");
            std::process::exit(1);
        }
    };
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash password");
    println!("{}", hash);
}
