mod helpers;
mod policy_test;
mod routing_test;
