use crate::email::Email;
use crate::Error;

/// A delivery backend that can send one email at a time.
///
/// Returns the HTTP status code of the accepted request. Rejections and
/// transport failures come back as `Err`.
pub trait Mailer {
    fn send(&self, email: &Email) -> Result<u16, Error>;
}


impl<T: Mailer + ?Sized> Mailer for &T {
    fn send(&self, email: &Email) -> Result<u16, Error> {
        (**self).send(email)
    }
}
