#[macro_export]
macro_rules! t {
    (now) => {{
        $crate::core::time::DateTime::now()
    }};

    ($amount:literal millis) => {{
        $crate::core::time::Duration::millis($amount)
    }};
    ($amount:literal seconds) => {{
        $crate::core::time::Duration::seconds($amount)
    }};
    ($amount:literal minutes) => {{
        $crate::core::time::Duration::minutes($amount)
    }};
    ($amount:literal hours) => {{
        $crate::core::time::Duration::hours($amount)
    }};
}

#[cfg(test)]
mod tests {
    use crate::core::time::*;

    #[test]
    fn test_now() {
        let now = t!(now);
        assert!(DateTime::now().elapsed_since(now) < Duration::seconds(1));
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(t!(1500 millis).as_secs_f64(), 1.5);
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(t!(10 seconds).as_secs(), 10);
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(t!(10 minutes).as_secs(), 600);
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(t!(2 hours).as_secs(), 7200);
    }

    #[tokio::test]
    async fn test_now_uses_fixed_now() {
        let fixed = DateTime::from_iso("2024-11-03T15:23:46Z").unwrap();

        let now = FIXED_NOW.scope(fixed, async { t!(now) }).await;

        assert_eq!(now, fixed);
    }
}
