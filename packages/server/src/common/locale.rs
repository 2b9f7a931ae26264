//! Locale handling and the localized message catalog.
//!
//! Messages are static per-locale tables keyed by error kind. The
//! catalog is opaque to the rest of the system: callers look up a
//! message by locale and field, nothing more.

use serde::{Deserialize, Serialize};

/// Supported interface languages. Unknown or absent values fall back
/// to Uzbek, the platform default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Uz,
    Ru,
    En,
}

impl Locale {
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value {
            Some("uz") => Locale::Uz,
            Some("ru") => Locale::Ru,
            Some("en") => Locale::En,
            _ => Locale::Uz,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Uz => "uz",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Uz
    }
}

pub struct SignupErrors {
    pub email_empty: &'static str,
    pub email_already_exists: &'static str,
    pub short_password: &'static str,
    pub long_password: &'static str,
    pub sending_verification_code: &'static str,
    pub invalid_email: &'static str,
    pub invalid_first_name: &'static str,
    pub invalid_phone_number: &'static str,
    pub phone_number_already_exists: &'static str,
}

pub const fn signup_errors(locale: Locale) -> &'static SignupErrors {
    match locale {
        Locale::Uz => &SignupErrors {
            email_empty: "Elektron pochtangizni kiriting.",
            email_already_exists:
                "Bu foydalanuvchi allaqachon mavjud. Yangi elektron pochtani sinab ko'ring.",
            short_password: "Parol kamida 8 ta belgidan iborat bo'lishi kerak.",
            long_password: "Parol ko'pi bilan 64 ta belgidan iborat bo'lishi kerak.",
            sending_verification_code:
                "Tasdiqlash kodini yuborishda xatolik yuz berdi. Iltimos keyinroq qayta urinib ko'ring.",
            invalid_email: "Iltimos, to'g'ri elektron pochta manzilini kiriting.",
            invalid_first_name: "Iltimos, ismingizni to'g'ri kiriting.",
            invalid_phone_number: "Iltimos, to'gri telefon raqam kiriting.",
            phone_number_already_exists:
                "Bu foydalanuvchi allaqachon mavjud. Yangi telefon raqamni sinab ko'ring.",
        },
        Locale::Ru => &SignupErrors {
            email_empty: "Введите свой адрес электронной почты.",
            email_already_exists:
                "Это пользователь уже существует. Попробуйте новый адрес электронной почты.",
            short_password: "Пароль должен содержать не менее 8 символов.",
            long_password: "Пароль должен содержать не более 64 символов.",
            sending_verification_code:
                "Произошла ошибка при отправке кода подтверждения. Пожалуйста, повторите попытку позже.",
            invalid_email: "Подалуйста, введите правильный адрес электронной почты.",
            invalid_first_name: "Пожалуйста, введите верное имя.",
            invalid_phone_number: "Пожалуйста, введите действительный номер телефона.",
            phone_number_already_exists:
                "Этот пользователь уже существует. Попробуйте новый номер телефона.",
        },
        Locale::En => &SignupErrors {
            email_empty: "Enter your email.",
            email_already_exists: "This user already exists. Try a new email.",
            short_password: "Password must contain at least 8 characters.",
            long_password: "Password must contain at most 64 characters.",
            sending_verification_code:
                "An error occurred while sending the verification code. Please try again later.",
            invalid_email: "Please enter a valid email.",
            invalid_first_name: "Please enter a valid name.",
            invalid_phone_number: "Please, enter a valid phone number.",
            phone_number_already_exists: "This user already exists. Try a new phone number.",
        },
    }
}

pub struct LoginErrors {
    pub missing_credentials: &'static str,
    pub incorrect_credentials_email: &'static str,
    pub incorrect_credentials_phone_number: &'static str,
}

pub const fn login_errors(locale: Locale) -> &'static LoginErrors {
    match locale {
        Locale::Uz => &LoginErrors {
            missing_credentials: "Iltimos, kerakli ma'lumotlarni kiriting.",
            incorrect_credentials_email: "Parol yoki elektron pochta noto'g'ri.",
            incorrect_credentials_phone_number: "Parol yoki telefon raqam noto'g'ri.",
        },
        Locale::Ru => &LoginErrors {
            missing_credentials: "Пожалуйста, введите необходимую информацию.",
            incorrect_credentials_email: "Пароль или адрес электронной почты неверны.",
            incorrect_credentials_phone_number: "Пароль или номер телефона неверный.",
        },
        Locale::En => &LoginErrors {
            missing_credentials: "Please enter required data.",
            incorrect_credentials_email: "Password or email is not correct.",
            incorrect_credentials_phone_number: "Password or phone number is not correct.",
        },
    }
}

pub struct VerifyErrors {
    pub code_absent: &'static str,
    pub code_invalid: &'static str,
    pub code_expired: &'static str,
    pub code_not_numeric: &'static str,
    pub cookies_modified: &'static str,
}

pub const fn verify_errors(locale: Locale) -> &'static VerifyErrors {
    match locale {
        Locale::Uz => &VerifyErrors {
            code_absent: "Iltimos, tasdiqlash kodini kiriting.",
            code_invalid: "Tasdiqlash kodi xato.",
            code_expired: "Tasdiqlash kodi muddati tugagan. Iltimos, yangi kod oling.",
            code_not_numeric: "Tasdiqlash kodi faqat raqamlardan iborat bo'lishi kerak.",
            cookies_modified:
                "Ruxsatsiz o'zgarishlar aniqlandi. Iltimos, qayta ro'yxatdan o'tishga urinib ko'ring.",
        },
        Locale::Ru => &VerifyErrors {
            code_absent: "Пожалуйста, введите код подтверждения.",
            code_invalid: "Неверный код подтверждения.",
            code_expired: "Срок действия кода подтверждения истек. Пожалуйста, получите новый код.",
            code_not_numeric: "Код подтверждения должен состоять только из цифр.",
            cookies_modified:
                "Обнаружены несанкционированные изменения. Пожалуйста, попробуйте зарегистрироваться еще раз.",
        },
        Locale::En => &VerifyErrors {
            code_absent: "Please enter the verification code.",
            code_invalid: "Invalid verification code.",
            code_expired: "The verification code has expired. Please get a new code.",
            code_not_numeric: "The verification code should consists of only numbers.",
            cookies_modified: "Unauthorized changes detected. Please try to sign up again.",
        },
    }
}

pub struct ProtectRoutesErrors {
    pub user_changed_password: &'static str,
}

pub const fn protect_routes_errors(locale: Locale) -> &'static ProtectRoutesErrors {
    match locale {
        Locale::Uz => &ProtectRoutesErrors {
            user_changed_password:
                "Foydalanuvchi yaqinda parolini o'zgartirdi. Iltimos, tizimga qayta kiring.",
        },
        Locale::Ru => &ProtectRoutesErrors {
            user_changed_password:
                "Пользователь недавно сменил свой пароль. Пожалуйста, войдите снова.",
        },
        Locale::En => &ProtectRoutesErrors {
            user_changed_password:
                "VerifiedUser has changed their password recently. Please log in again.",
        },
    }
}

pub struct RestrictToErrors {
    pub not_allowed: &'static str,
}

pub const fn restrict_to_errors(locale: Locale) -> &'static RestrictToErrors {
    match locale {
        Locale::Uz => &RestrictToErrors {
            not_allowed: "Sizda bu amalni bajarish uchun ruxsat yo‘q.",
        },
        Locale::Ru => &RestrictToErrors {
            not_allowed: "У вас нет разрешения на выполнение этого действия.",
        },
        Locale::En => &RestrictToErrors {
            not_allowed: "You do not have permission to do this action.",
        },
    }
}

pub struct SignupResponses {
    pub sent_to_email: &'static str,
    pub sent_to_phone_number: &'static str,
}

pub const fn signup_responses(locale: Locale) -> &'static SignupResponses {
    match locale {
        Locale::Uz => &SignupResponses {
            sent_to_email: "Tasdiqlash kodi elektron pochtangizga yuborildi.",
            sent_to_phone_number: "Tasdiqlash kodi telefon raqamingizga yuborildi.",
        },
        Locale::Ru => &SignupResponses {
            sent_to_email: "Код подтверждения был отправлен на вашу электронную почту.",
            sent_to_phone_number: "Код подтверждения был отправлен на ваш номер телефона.",
        },
        Locale::En => &SignupResponses {
            sent_to_email: "Verification code has been sent to your email.",
            sent_to_phone_number: "Verification code has been sent to your phone number.",
        },
    }
}

pub struct VerificationMessage {
    pub subject: &'static str,
    pub text: &'static str,
}

/// Subject/body for the verification email and SMS; the code is
/// appended to `text` at send time.
pub const fn verification_message(locale: Locale) -> &'static VerificationMessage {
    match locale {
        Locale::Uz => &VerificationMessage {
            subject: "Almond.uz uchun tasdiqlash kodi (faqat 10 daqiqa amal qiladi)",
            text: "Tasdiqlash kodingiz: ",
        },
        Locale::Ru => &VerificationMessage {
            subject: "Код подтверждения для Almond.uz (действителен только 10 минут)",
            text: "Ваш код подтверждения: ",
        },
        Locale::En => &VerificationMessage {
            subject: "Verification Code for Almond.uz (valid only for 10 minutues)",
            text: "Your verification code: ",
        },
    }
}

// Token errors are not localized in the catalog.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token. New log in required.";
pub const EXPIRED_TOKEN_MESSAGE: &str = "Expired token. New log in required.";
