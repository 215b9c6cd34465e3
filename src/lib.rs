//! 智能投顾系统管理终端
//!
//! 资产、标签、投资组合、策略、市场数据的增删改查，风险测评问卷，
//! 以及保存在本地 SQLite 的特征库。UI 线程只持有页面状态，
//! 所有 IO 由后台 actor 执行后以事件返回。

pub mod app_service;
pub mod app_state;
pub mod commands;
pub mod config;
pub mod crud;
pub mod model;
pub mod pages;
pub mod session;
pub mod storage;
pub mod ui;
