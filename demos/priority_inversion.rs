//! Priority Inversion Demo - mutex priority inheritance
//!
//! Three tasks: High(30), Med(20), Low(10)
//! Low holds the mutex -> High waits -> Low is boosted to prio 30

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(target_arch = "arm")]
mod demo {
    use core::sync::atomic::{AtomicU32, Ordering};

    use cortex_m_rt::entry;
    use defmt::info;
    use uposix::mutex::{Mutex, MutexAttr, Protocol};
    use uposix::os_task_create;
    use uposix::task::OsTcb;
    use uposix::time::os_time_dly;
    use uposix::types::OsStkElement;

    static HIGH_RUNS: AtomicU32 = AtomicU32::new(0);
    static LOW_RUNS: AtomicU32 = AtomicU32::new(0);

    static MTX: Mutex = Mutex::new();

    static mut HIGH_STK: [OsStkElement; 256] = [0; 256];
    static mut HIGH_TCB: OsTcb = OsTcb::new();
    static mut MED_STK: [OsStkElement; 256] = [0; 256];
    static mut MED_TCB: OsTcb = OsTcb::new();
    static mut LOW_STK: [OsStkElement; 256] = [0; 256];
    static mut LOW_TCB: OsTcb = OsTcb::new();

    /// High priority task (prio=30)
    fn high_task_fn(_arg: *mut ()) -> ! {
        let _ = os_time_dly(50);

        loop {
            let n = HIGH_RUNS.fetch_add(1, Ordering::Relaxed) + 1;

            let _ = MTX.lock();
            info!("[HIGH] acquired #{}", n);

            for _ in 0..1_000 {
                cortex_m::asm::nop();
            }

            let _ = MTX.unlock();
            let _ = os_time_dly(100);
        }
    }

    /// Medium priority task (prio=20) - CPU bound
    fn med_task_fn(_arg: *mut ()) -> ! {
        loop {
            for _ in 0..50_000 {
                cortex_m::asm::nop();
            }
            let _ = os_time_dly(10);
        }
    }

    /// Low priority task (prio=10) - holds mutex long
    fn low_task_fn(_arg: *mut ()) -> ! {
        loop {
            let n = LOW_RUNS.fetch_add(1, Ordering::Relaxed) + 1;

            let _ = MTX.lock();
            info!("[LOW] holding #{}", n);

            for _ in 0..100_000 {
                cortex_m::asm::nop();
            }

            let _ = MTX.unlock();
            let _ = os_time_dly(200);
        }
    }

    #[entry]
    fn main() -> ! {
        info!("Priority Inversion Demo: H(30) M(20) L(10)");

        uposix::os_init().expect("OS init failed");

        let attr = MutexAttr {
            protocol: Protocol::Inherit,
            name: "Mtx",
            ..MutexAttr::new()
        };
        MTX.create(&attr).unwrap();

        #[allow(static_mut_refs)]
        unsafe {
            os_task_create(&mut LOW_TCB, &mut LOW_STK, "L", low_task_fn, 10).unwrap();
            os_task_create(&mut MED_TCB, &mut MED_STK, "M", med_task_fn, 20).unwrap();
            os_task_create(&mut HIGH_TCB, &mut HIGH_STK, "H", high_task_fn, 30).unwrap();
        }

        info!("Starting...");
        uposix::os_start().expect("OS start failed");

        loop {
            cortex_m::asm::wfi();
        }
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
