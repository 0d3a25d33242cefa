//! Unit tests for core kernel modules
//!
//! These tests run on the host (not the embedded target) to verify the
//! core data structures work correctly.

#[cfg(test)]
mod prio_tests {
    use uposix::config::{CFG_PRIO_IDLE, CFG_PRIO_MAX};
    use uposix::prio::PrioTable;

    #[test]
    fn test_empty_table() {
        let table = PrioTable::new();
        assert!(table.is_empty());
        assert_eq!(table.get_highest(), CFG_PRIO_IDLE);
    }

    #[test]
    fn test_single_priority() {
        let mut table = PrioTable::new();

        table.insert(5);
        assert!(!table.is_empty());
        assert!(table.is_set(5));
        assert!(!table.is_set(4));
        assert_eq!(table.get_highest(), 5);

        table.remove(5);
        assert!(table.is_empty());
    }

    #[test]
    fn test_multiple_priorities() {
        let mut table = PrioTable::new();

        // Insert in random order
        table.insert(20);
        table.insert(5);
        table.insert(10);
        table.insert(63);
        table.insert(15);

        // Most urgent (largest number) should win
        assert_eq!(table.get_highest(), 63);

        // Remove from the top down
        table.remove(63);
        assert_eq!(table.get_highest(), 20);

        table.remove(20);
        assert_eq!(table.get_highest(), 15);

        table.remove(15);
        assert_eq!(table.get_highest(), 10);

        table.remove(10);
        assert_eq!(table.get_highest(), 5);

        table.remove(5);
        assert!(table.is_empty());
    }

    #[test]
    fn test_word_boundaries() {
        let mut table = PrioTable::new();

        // Test around the 32-bit word boundary (31, 32, 33)
        table.insert(31);
        assert_eq!(table.get_highest(), 31);

        table.insert(32);
        assert_eq!(table.get_highest(), 32);

        table.remove(32);
        assert_eq!(table.get_highest(), 31);

        table.insert(63);
        assert_eq!(table.get_highest(), 63);

        table.insert(33);
        table.remove(63);
        table.remove(31);
        assert_eq!(table.get_highest(), 33);
    }

    #[test]
    fn test_all_priorities() {
        let mut table = PrioTable::new();

        for i in 0..CFG_PRIO_MAX {
            table.insert(i as u8);
        }

        assert_eq!(table.get_highest(), (CFG_PRIO_MAX - 1) as u8);

        // Remove from most to least urgent
        for i in (0..CFG_PRIO_MAX).rev() {
            assert_eq!(table.get_highest(), i as u8);
            table.remove(i as u8);
        }

        assert!(table.is_empty());
    }
}

#[cfg(test)]
mod error_tests {
    use uposix::error::{OsError, OsResult};

    #[test]
    fn test_error_equality() {
        assert_eq!(OsError::TimedOut, OsError::TimedOut);
        assert_ne!(OsError::TimedOut, OsError::WouldBlock);
        assert_ne!(OsError::Deadlock, OsError::Again);
    }

    #[test]
    fn test_error_debug() {
        // Ensure errors can be formatted for debugging
        let err = OsError::NotRecoverable;
        let s = format!("{:?}", err);
        assert!(s.contains("NotRecoverable"));
    }

    #[test]
    fn test_result_alias() {
        fn ok() -> OsResult<u32> {
            Ok(7)
        }
        fn err() -> OsResult<u32> {
            Err(OsError::NotPermitted)
        }

        assert_eq!(ok(), Ok(7));
        assert_eq!(err(), Err(OsError::NotPermitted));
    }
}

#[cfg(test)]
mod types_tests {
    use uposix::types::*;

    #[test]
    fn test_task_state_enum() {
        let state = OsTaskState::Ready;
        assert_eq!(state, OsTaskState::Ready);
        assert_ne!(state, OsTaskState::Delayed);
        assert_ne!(state, OsTaskState::PendTimeout);
    }

    #[test]
    fn test_pend_status_enum() {
        let status = OsPendStatus::Ok;
        assert_eq!(status, OsPendStatus::Ok);
        assert_ne!(status, OsPendStatus::Timeout);
        assert_ne!(status, OsPendStatus::Interrupted);
        assert_ne!(status, OsPendStatus::Reset);
    }

    #[test]
    fn test_fresh_tcb() {
        use uposix::task::OsTcb;

        let tcb = OsTcb::new();
        assert!(tcb.is_ready());
        assert!(!tcb.is_pending());
        assert!(!tcb.interrupted);
        assert_eq!(tcb.acquired_mutexes, 0);
        assert!(tcb.wait_list.is_null());
        assert!(tcb.tick_clock.is_null());
    }
}

#[cfg(test)]
mod config_tests {
    use uposix::config::*;

    #[test]
    fn test_config_values() {
        assert!(CFG_PRIO_MAX >= 8, "Need at least 8 priority levels");
        assert!(CFG_PRIO_MAX <= 256, "Too many priority levels");

        assert!(CFG_STK_SIZE_MIN >= 32, "Stack too small");

        assert!(CFG_TICK_RATE_HZ >= 10, "Tick rate too slow");
        assert!(CFG_TICK_RATE_HZ <= 10000, "Tick rate too fast");

        assert!(CFG_TICK_WHEEL_SIZE > 0, "Timeout wheel needs a slot");

        // Idle priority is the least urgent
        assert_eq!(CFG_PRIO_IDLE, 0);
    }
}

#[cfg(test)]
mod sem_tests {
    use uposix::error::OsError;
    use uposix::sem::{OsSem, Semaphore};

    #[test]
    fn test_counting() {
        let mut sem = OsSem::new(0);
        sem.create(2, "test").unwrap();

        assert_eq!(sem.count(), 2);
        assert_eq!(sem.try_pend(), Ok(()));
        assert_eq!(sem.try_pend(), Ok(()));
        assert_eq!(sem.try_pend(), Err(OsError::WouldBlock));
        assert_eq!(sem.count(), 0);

        assert_eq!(sem.post(), Ok(1));
        assert_eq!(sem.count(), 1);
        assert_eq!(sem.try_pend(), Ok(()));
    }

    #[test]
    fn test_uncreated_rejected() {
        let mut sem = OsSem::new(0);
        assert_eq!(sem.try_pend(), Err(OsError::InvalidArgument));
        assert_eq!(sem.post(), Err(OsError::InvalidArgument));
    }

    #[test]
    fn test_wrapper() {
        let sem = Semaphore::new(0);
        sem.create(1, "wrapped").unwrap();

        assert_eq!(sem.try_wait(), Ok(()));
        assert_eq!(sem.try_wait(), Err(OsError::WouldBlock));
        assert_eq!(sem.signal(), Ok(1));
        assert_eq!(sem.count(), 1);
    }
}
