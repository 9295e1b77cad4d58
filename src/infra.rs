//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Suite Runner,
//! including timestamp formatting, the blocking delay primitive and
//! report file output.
//!
//! 此模块为 Suite Runner 提供基础设施服务，
//! 包括时间戳格式化、阻塞延迟原语和报告文件输出。

pub mod fs;
pub mod time;
