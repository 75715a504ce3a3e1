// ==========================================
// 商品目录导入系统 - 应用层
// ==========================================
// 职责: HTTP 集成,连接调用方与导入管道
// ==========================================

pub mod common;
pub mod routes;
pub mod state;

// 重导出
pub use common::ErrorResponse;
pub use routes::{router, TENANT_HEADER};
pub use state::{get_default_db_path, AppState, ServerConfig};
