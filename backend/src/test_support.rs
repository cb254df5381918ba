//! Test utilities for the outreach crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The crate avoids direct `std::fs` calls. These helpers build on
    //! `cap_std::fs::Dir` so test suites share policy-compliant file access.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use outreach::test_support::cap_fs::write_file;
    ///
    /// let path = std::env::temp_dir().join("outreach-cap-fs-write-example.txt");
    /// write_file(&path, b"snapshot\n")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod clock {
    //! Deterministic clocks.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Build a UTC instant, panicking on invalid input.
    pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid instant {year}-{month}-{day} {hour}:{minute}"))
    }

    /// Clock whose current instant can be moved by tests.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Start the clock at `now`.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Jump to `now`.
        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        /// Move the clock forward.
        pub fn advance(&self, delta: TimeDelta) {
            *self.lock_clock() += delta;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod users {
    //! Builders for common user shapes.

    use chrono::{DateTime, Utc};

    use crate::domain::{
        DevicePlatform, DeviceToken, DisplayName, OutreachUserBuilder, UserId,
    };

    /// Start a user with a random id and the given display name.
    pub fn user_named(name: &str) -> OutreachUserBuilder {
        let display_name = match DisplayName::new(name) {
            Ok(display_name) => display_name,
            Err(error) => panic!("invalid display name {name:?}: {error}"),
        };
        OutreachUserBuilder::new(UserId::random(), display_name)
    }

    /// An active token last used at `now`.
    pub fn usable_token(now: DateTime<Utc>) -> DeviceToken {
        DeviceToken {
            token: format!("token-{}", now.timestamp()),
            platform: DevicePlatform::Ios,
            active: true,
            last_used_at: now,
        }
    }
}

pub mod senders {
    //! Scripted channel doubles that record what they were asked to send.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::OutreachUser;
    use crate::domain::ports::{
        EmailSender, EmailSenderError, OutreachEmail, PushDelivery, PushMessage, PushSender,
        PushSenderError, SmsGateway, SmsGatewayError,
    };

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("sender mutex"),
        }
    }

    /// Push double returning a fixed result.
    pub struct ScriptedPushSender {
        result: Result<PushDelivery, PushSenderError>,
        sent: Mutex<Vec<PushMessage>>,
    }

    impl ScriptedPushSender {
        /// Report `sent` accepted devices for every call.
        pub fn delivering(sent: u32) -> Self {
            Self::with_result(Ok(PushDelivery { sent, failed: 0 }))
        }

        /// Fail every call with a provider error.
        pub fn failing(message: &str) -> Self {
            Self::with_result(Err(PushSenderError::provider(message)))
        }

        fn with_result(result: Result<PushDelivery, PushSenderError>) -> Self {
            Self {
                result,
                sent: Mutex::new(Vec::new()),
            }
        }

        /// Messages passed to the sender.
        pub fn messages(&self) -> Vec<PushMessage> {
            lock(&self.sent).clone()
        }
    }

    #[async_trait]
    impl PushSender for ScriptedPushSender {
        async fn send_to_user(
            &self,
            _user: &OutreachUser,
            message: &PushMessage,
        ) -> Result<PushDelivery, PushSenderError> {
            lock(&self.sent).push(message.clone());
            self.result.clone()
        }
    }

    /// Email double that accepts or rejects every email.
    pub struct ScriptedEmailSender {
        accept: bool,
        sent: Mutex<Vec<OutreachEmail>>,
    }

    impl ScriptedEmailSender {
        /// Accept every email.
        pub fn accepting() -> Self {
            Self {
                accept: true,
                sent: Mutex::new(Vec::new()),
            }
        }

        /// Reject every email.
        pub fn rejecting() -> Self {
            Self {
                accept: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        /// Emails passed to the sender, accepted or not.
        pub fn emails(&self) -> Vec<OutreachEmail> {
            lock(&self.sent).clone()
        }
    }

    #[async_trait]
    impl EmailSender for ScriptedEmailSender {
        async fn enqueue(&self, email: &OutreachEmail) -> Result<(), EmailSenderError> {
            lock(&self.sent).push(email.clone());
            if self.accept {
                Ok(())
            } else {
                Err(EmailSenderError::queue("mail queue rejected the job"))
            }
        }
    }

    /// SMS gateway double.
    pub struct ScriptedSmsGateway {
        accept: bool,
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedSmsGateway {
        /// Accept every message.
        pub fn accepting() -> Self {
            Self {
                accept: true,
                delivered: Mutex::new(Vec::new()),
            }
        }

        /// Reject every message.
        pub fn rejecting() -> Self {
            Self {
                accept: false,
                delivered: Mutex::new(Vec::new()),
            }
        }

        /// `(phone, body)` pairs the gateway accepted.
        pub fn deliveries(&self) -> Vec<(String, String)> {
            lock(&self.delivered).clone()
        }
    }

    #[async_trait]
    impl SmsGateway for ScriptedSmsGateway {
        async fn deliver(&self, phone: &str, body: &str) -> Result<String, SmsGatewayError> {
            if !self.accept {
                return Err(SmsGatewayError::provider("carrier rejected message"));
            }
            let mut delivered = lock(&self.delivered);
            delivered.push((phone.to_owned(), body.to_owned()));
            Ok(format!("SM{:04}", delivered.len()))
        }
    }
}
