// ABOUTME: Compile-fail test verifying the live pointer cannot be recorded early.
// ABOUTME: This test should fail to compile, validating promotion order.

use stagehand::deploy::{Engine, Promotion, Validated};
use stagehand::store::MemoryStore;

async fn try_early_record(promotion: Promotion<Validated>, engine: &Engine<'_, MemoryStore>) {
    // ERROR: record_pointer() method doesn't exist on Promotion<Validated>
    promotion.record_pointer(engine).await;
}

fn main() {}
