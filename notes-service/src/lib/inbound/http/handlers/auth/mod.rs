pub mod change_password;
pub mod login;
pub mod login_with_otp;
pub mod refresh;
pub mod register;
pub mod send_otp;
pub mod set_password;
