//! Print a freshly generated JWT secret and bcrypt pepper.
//!
//! ```text
//! $ userauth-gensecret
//! JWT_SECRET=...
//! BCRYPT_PEPPER=...
//! ```
//!
//! Values are drawn from letters, digits and punctuation with the thread-local
//! CSPRNG. `=`, quotes, backslash, `#` and `$` are left out so the output can be
//! pasted into a `.env` file unquoted.

use rand::seq::IndexedRandom;

const JWT_SECRET_LEN: usize = 64;
const PEPPER_LEN: usize = 32;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!%&()*+,-./:;<>?@[]^_{|}~";

fn generate(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .filter_map(|_| ALPHABET.choose(&mut rng).map(|&b| char::from(b)))
        .collect()
}

fn main() {
    println!("JWT_SECRET={}", generate(JWT_SECRET_LEN));
    println!("BCRYPT_PEPPER={}", generate(PEPPER_LEN));
}
