//! S3 Console Library
//!
//! Storage integration core for a front end managing S3-compatible object
//! stores: configuration resolution, bucket/object operations, error
//! translation and streamed downloads.

pub mod s3;
