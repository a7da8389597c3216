//! Named session operations

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Login,
    Register,
    VerifyOtp,
    ResendOtp,
    Refresh,
    GetCurrentUser,
    ForgotPassword,
    ResetPassword,
    UpdatePassword,
    Logout,
    FetchAllUsers,
    UpdateUserById,
    DeleteUserById,
    RegisterAdmin,
    FetchProfile,
    UpdateProfile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "auth/login",
            Operation::Register => "auth/register",
            Operation::VerifyOtp => "auth/verifyOtp",
            Operation::ResendOtp => "auth/resendOtp",
            Operation::Refresh => "auth/refresh",
            Operation::GetCurrentUser => "auth/getCurrentUser",
            Operation::ForgotPassword => "auth/forgotPassword",
            Operation::ResetPassword => "auth/resetPassword",
            Operation::UpdatePassword => "auth/updatePassword",
            Operation::Logout => "auth/logout",
            Operation::FetchAllUsers => "admin/fetchAllUsers",
            Operation::UpdateUserById => "admin/updateUserById",
            Operation::DeleteUserById => "admin/deleteUserById",
            Operation::RegisterAdmin => "admin/registerAdmin",
            Operation::FetchProfile => "user/fetchProfile",
            Operation::UpdateProfile => "user/updateProfile",
        }
    }

    /// Error shown when the server gives no message of its own
    pub fn fallback_error(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::VerifyOtp => "OTP verification failed",
            Operation::ResendOtp => "Failed to resend OTP",
            Operation::Refresh => "Token refresh failed",
            Operation::GetCurrentUser => "Failed to fetch user",
            Operation::ForgotPassword => "Failed to send reset email",
            Operation::ResetPassword => "Password reset failed",
            Operation::UpdatePassword => "Failed to update password",
            Operation::Logout => "Logout failed",
            Operation::FetchAllUsers => "Failed to fetch users",
            Operation::UpdateUserById => "Failed to update user",
            Operation::DeleteUserById => "Failed to delete user",
            Operation::RegisterAdmin => "Failed to register admin",
            Operation::FetchProfile => "Failed to fetch profile",
            Operation::UpdateProfile => "Failed to update profile",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
