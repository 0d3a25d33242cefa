//! Wait list for tasks blocked on a kernel object
//!
//! Intrusive doubly-linked list ordered by descending effective priority,
//! FIFO among equals, so the head is always the next task to wake.
//! Linking records the list in the TCB, which makes [`WaitList::unlink`]
//! idempotent: the unlock path, the tick handler, task interruption and
//! object reset may race to detach the same node and every path after the
//! first is a no-op. A blocked task relies on this to guarantee it is
//! detached on every exit from its wait, including cancellation and
//! timeout.

use core::ptr::NonNull;

use crate::task::OsTcb;
use crate::types::{OsPendOn, OsPrio};

/// Priority-ordered list of tasks waiting on one kernel object
///
/// Insertion walks from the head, so no tail pointer is kept.
#[derive(Debug)]
pub struct WaitList {
    head: Option<NonNull<OsTcb>>,
}

impl WaitList {
    /// Create a new empty wait list
    pub const fn new() -> Self {
        WaitList { head: None }
    }

    /// Initialize the wait list
    pub fn init(&mut self) {
        self.head = None;
    }

    /// Check if list is empty
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Get the head of the list: the highest-priority, earliest-linked
    /// waiter
    #[inline(always)]
    pub fn head(&self) -> Option<NonNull<OsTcb>> {
        self.head
    }

    /// Priority of the most urgent waiter, `None` when the list is empty
    #[inline]
    pub fn highest_prio(&self) -> Option<OsPrio> {
        self.head.map(|tcb| unsafe { tcb.as_ref().prio })
    }

    /// Link a task into the list in priority order
    ///
    /// Records the list, the owning object and the pend kind in the TCB.
    ///
    /// # Safety
    /// `tcb` must be valid and not linked into any wait list; the caller
    /// must hold an interrupt critical section.
    pub unsafe fn link(&mut self, tcb: NonNull<OsTcb>, obj: *const (), pend_on: OsPendOn) {
        let prio = unsafe { tcb.as_ref().prio };

        // Insert before the first strictly less urgent waiter; equal
        // priorities stay FIFO by link time.
        let mut next = self.head;
        let mut prev: Option<NonNull<OsTcb>> = None;

        while let Some(cur_ptr) = next {
            let cur_ref = unsafe { cur_ptr.as_ref() };
            if cur_ref.prio < prio {
                break;
            }
            prev = next;
            next = cur_ref.wait_next_ptr;
        }

        let tcb_ref = unsafe { &mut *tcb.as_ptr() };
        tcb_ref.wait_prev_ptr = prev;
        tcb_ref.wait_next_ptr = next;
        tcb_ref.wait_list = self as *mut WaitList;
        tcb_ref.wait_obj = obj;
        tcb_ref.pend_on = pend_on;

        match prev {
            Some(p) => unsafe { (*p.as_ptr()).wait_next_ptr = Some(tcb) },
            None => self.head = Some(tcb),
        }

        if let Some(n) = next {
            unsafe { (*n.as_ptr()).wait_prev_ptr = Some(tcb) };
        }
    }

    /// Detach a task from whatever wait list it is linked into
    ///
    /// Idempotent: a no-op when another wake path already detached it.
    ///
    /// # Safety
    /// The caller must hold an interrupt critical section.
    pub unsafe fn unlink(tcb: NonNull<OsTcb>) {
        let list = unsafe { tcb.as_ref().wait_list };
        if list.is_null() {
            return;
        }
        unsafe { (*list).remove(tcb) };
    }

    /// Re-sort a linked task after its priority changed
    ///
    /// # Safety
    /// `tcb` must be linked into this list; the caller must hold an
    /// interrupt critical section.
    pub unsafe fn requeue(&mut self, tcb: NonNull<OsTcb>) {
        let (obj, pend_on) = {
            let tcb_ref = unsafe { tcb.as_ref() };
            (tcb_ref.wait_obj, tcb_ref.pend_on)
        };

        unsafe {
            self.remove(tcb);
            self.link(tcb, obj, pend_on);
        }
    }

    unsafe fn remove(&mut self, tcb: NonNull<OsTcb>) {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };

        match tcb_ref.wait_prev_ptr {
            Some(prev) => unsafe { (*prev.as_ptr()).wait_next_ptr = tcb_ref.wait_next_ptr },
            None => self.head = tcb_ref.wait_next_ptr,
        }

        if let Some(next) = tcb_ref.wait_next_ptr {
            unsafe { (*next.as_ptr()).wait_prev_ptr = tcb_ref.wait_prev_ptr };
        }

        tcb_ref.wait_prev_ptr = None;
        tcb_ref.wait_next_ptr = None;
        tcb_ref.wait_list = core::ptr::null_mut();
    }
}

impl Default for WaitList {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for WaitList {}
unsafe impl Sync for WaitList {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OsPendOn;
    use std::boxed::Box;
    use std::vec::Vec;

    fn tcb_with_prio(prio: OsPrio) -> Box<OsTcb> {
        let mut tcb = Box::new(OsTcb::new());
        tcb.prio = prio;
        tcb
    }

    fn collect_prios(list: &WaitList) -> Vec<OsPrio> {
        let mut prios = Vec::new();
        let mut cur = list.head();
        while let Some(ptr) = cur {
            let tcb = unsafe { ptr.as_ref() };
            prios.push(tcb.prio);
            cur = tcb.wait_next_ptr;
        }
        prios
    }

    #[test]
    fn test_priority_ordering() {
        let mut list = WaitList::new();
        let mut a = tcb_with_prio(10);
        let mut b = tcb_with_prio(30);
        let mut c = tcb_with_prio(20);

        unsafe {
            list.link(NonNull::from(a.as_mut()), core::ptr::null(), OsPendOn::Mutex);
            list.link(NonNull::from(b.as_mut()), core::ptr::null(), OsPendOn::Mutex);
            list.link(NonNull::from(c.as_mut()), core::ptr::null(), OsPendOn::Mutex);
        }

        assert_eq!(collect_prios(&list), [30, 20, 10]);
        assert_eq!(list.highest_prio(), Some(30));
    }

    #[test]
    fn test_fifo_among_equals() {
        let mut list = WaitList::new();
        let mut first = tcb_with_prio(20);
        let mut second = tcb_with_prio(20);
        first.name = "first";
        second.name = "second";

        unsafe {
            list.link(
                NonNull::from(first.as_mut()),
                core::ptr::null(),
                OsPendOn::Mutex,
            );
            list.link(
                NonNull::from(second.as_mut()),
                core::ptr::null(),
                OsPendOn::Mutex,
            );
        }

        let head = list.head().unwrap();
        assert_eq!(unsafe { head.as_ref().name }, "first");
    }

    #[test]
    fn test_unlink_is_idempotent() {
        let mut list = WaitList::new();
        let mut a = tcb_with_prio(10);
        let mut b = tcb_with_prio(20);
        let a_ptr = NonNull::from(a.as_mut());
        let b_ptr = NonNull::from(b.as_mut());

        unsafe {
            list.link(a_ptr, core::ptr::null(), OsPendOn::Mutex);
            list.link(b_ptr, core::ptr::null(), OsPendOn::Mutex);

            WaitList::unlink(a_ptr);
            // Second unlink of the same node must be a no-op.
            WaitList::unlink(a_ptr);
        }

        assert_eq!(collect_prios(&list), [20]);
        assert!(a.wait_list.is_null());

        unsafe {
            WaitList::unlink(b_ptr);
            WaitList::unlink(b_ptr);
        }
        assert!(list.is_empty());
    }

    #[test]
    fn test_requeue_after_priority_change() {
        let mut list = WaitList::new();
        let mut a = tcb_with_prio(10);
        let mut b = tcb_with_prio(20);
        let a_ptr = NonNull::from(a.as_mut());

        unsafe {
            list.link(a_ptr, core::ptr::null(), OsPendOn::Mutex);
            list.link(NonNull::from(b.as_mut()), core::ptr::null(), OsPendOn::Mutex);
        }
        assert_eq!(collect_prios(&list), [20, 10]);

        a.prio = 30;
        unsafe { list.requeue(a_ptr) };

        assert_eq!(collect_prios(&list), [30, 20]);
    }
}
