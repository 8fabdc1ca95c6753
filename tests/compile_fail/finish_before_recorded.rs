// ABOUTME: Compile-fail test verifying a promotion cannot finish before the pointer is recorded.
// ABOUTME: This test should fail to compile, validating promotion order.

use stagehand::deploy::{EntryPublished, Promotion};

fn try_finish(promotion: Promotion<EntryPublished>) {
    // ERROR: finish() method doesn't exist on Promotion<EntryPublished>
    let _ = promotion.finish();
}

fn main() {}
