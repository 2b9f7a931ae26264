pub mod login;
pub mod signup;
pub mod tokens;
pub mod verify;

pub use login::{login, logout, LoginRequest};
pub use signup::{
    signup_with_email, signup_with_phone, SignupBinding, SignupReceipt, SignupWithEmailRequest,
    SignupWithPhoneRequest,
};
pub use tokens::{issue_tokens, TokenPair};
pub use verify::{verify, VerifyBindings, VerifyRequest};
