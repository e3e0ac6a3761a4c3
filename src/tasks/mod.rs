pub mod digest_task;
