//! # hq-db
//!
//! PostgreSQL data layer for BranchHQ:
//!
//! - Connection pool management and idempotent schema bootstrap
//! - Repository pattern for CRUD operations, one repository per entity
//! - The Postgres implementations of the `hq-files` metadata store and
//!   chunked blob storage traits
//!
//! ## Example
//!
//! ```ignore
//! use hq_db::{Database, DatabaseConfig, TaskRepository, Repository};
//!
//! let db = Database::connect(&DatabaseConfig::from_env()).await?;
//! db.ensure_schema().await?;
//!
//! let repo = TaskRepository::new(db.pool().clone());
//! let task = repo.find_by_id(1).await?;
//! ```

pub mod announcements;
pub mod assigned_tasks;
pub mod blobs;
pub mod categories;
pub mod cylinders;
pub mod files;
pub mod locations;
pub mod pool;
pub mod repository;
pub mod tasks;
pub mod tickets;
pub mod users;
pub mod zones;

// Re-exports
pub use announcements::{AnnouncementRepository, AnnouncementRow, CreateAnnouncementDto};
pub use assigned_tasks::{AssignedTaskRepository, AssignedTaskRow, CreateAssignedTaskDto};
pub use blobs::GridStore;
pub use categories::{CategoryRepository, CategoryRow, CreateCategoryDto, UpdateCategoryDto};
pub use cylinders::{CreateCylinderExpiryDto, CylinderEntry, CylinderRepository, CylinderRow};
pub use files::FileRepository;
pub use locations::{CreateLocationDto, LocationRepository, LocationRow, UpdateLocationDto};
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use repository::{Repository, RepositoryError, RepositoryResult};
pub use tasks::{CreateTaskDto, TaskRepository, TaskRow, UpdateTaskDto};
pub use tickets::{generate_ticket_number, CreateTicketDto, TicketRepository, TicketRow};
pub use users::{CreateUserDto, UpdateUserDto, UserRepository, UserRow};
pub use zones::{ZoneRepository, ZoneRow, DEFAULT_ZONES};
