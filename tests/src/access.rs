use crate::util::run_prog;
use common::status::ExitStatus;

#[test]
fn user_store_into_kernel_region_denied() {
    // store AC at 1500
    let (status, _, _) = run_prog("7\n1500\n", 0);
    assert_eq!(status, ExitStatus::KernelMemAccessDenied);

    // The region starts at 1000 and runs to the end of memory.
    for addr in ["1000", "1499", "1999"] {
        let (status, _, _) = run_prog(&format!("7\n{addr}\n"), 0);
        assert_eq!(status, ExitStatus::KernelMemAccessDenied, "addr {addr}");
    }
}

#[test]
fn user_store_out_of_bounds() {
    for addr in ["2000", "2500"] {
        let (status, _, _) = run_prog(&format!("7\n{addr}\n"), 0);
        assert_eq!(status, ExitStatus::OutOfBounds, "addr {addr}");
    }
}

#[test]
fn negative_address_out_of_bounds() {
    // AC = 0 - 5 = -5 via X, install as SP, then push to write below
    // the bottom of memory.
    let src = "1\n5\n14\n1\n0\n12\n18\n27\n";
    let (status, _, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::OutOfBounds);
}

#[test]
fn fetch_from_kernel_region_in_user_mode_denied() {
    // jump 1500: the next fetch itself violates the policy
    let (status, _, _) = run_prog("20\n1500\n", 0);
    assert_eq!(status, ExitStatus::KernelMemAccessDenied);
}

#[test]
fn kernel_touch_of_user_region_denied() {
    // Software trap; the handler stores into the user region.
    let src = "29\n.1500\n7\n50\n";
    let (status, _, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::UserMemAccessDenied);
}

#[test]
fn kernel_read_of_user_region_denied() {
    // Handler does a direct load from address 0.
    let src = "29\n.1500\n2\n0\n";
    let (status, _, _) = run_prog(src, 0);
    assert_eq!(status, ExitStatus::UserMemAccessDenied);
}
