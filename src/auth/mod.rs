//! Authentication: register, login, session tokens and cookies.

mod cookie;
mod flow;
mod handlers;
mod jwt;
mod password;

pub use cookie::{CookieSettings, SESSION_COOKIE_NAME};
pub use flow::{AuthFlow, LoginOutcome, PASSWORDS_DO_NOT_MATCH};
pub use handlers::{login, register, LoginRequest, RegisterRequest, MISSING_CREDENTIALS};
pub use jwt::{Claims, SessionTokens};
pub use password::{Passwords, BCRYPT_COST};
