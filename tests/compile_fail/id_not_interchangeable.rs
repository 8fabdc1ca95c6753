// ABOUTME: Compile-fail test verifying TargetId and DeploymentId are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use stagehand::types::{DeploymentId, TargetId};

fn takes_deployment_id(_id: DeploymentId) {}

fn main() {
    let target = TargetId::new("site");
    takes_deployment_id(target); // ERROR: expected DeploymentId, found TargetId
}
