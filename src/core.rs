//! # Core Engine Module / 核心引擎模块
//!
//! This module contains the test model, the registry, the selector and
//! ordering engines, the per-test run state machine and the runner
//! orchestrator.
//!
//! 此模块包含测试模型、注册表、选择器与排序引擎、
//! 单个测试的运行状态机以及运行器编排器。

pub mod config;
pub mod context;
pub mod decl;
pub mod model;
pub mod ordering;
pub mod record;
pub mod registry;
pub mod runner;
pub mod selector;
