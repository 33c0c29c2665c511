use crate::config::DatabaseConfig;
use crate::error::ApiError;
use crate::models::school::{NewSchool, ReferencePoint, School, SchoolWithDistance};
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tracing::{error, info, warn};

/// PostgreSQL への接続プールを握るリポジトリ層。
/// Deadpool の `Pool` を内部に保持し、学校レコードへの操作をメソッドとして提供する。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// 接続プールを構築する。Deadpool は遅延接続なので、ここではまだ
    /// DB への接続は張られない。疎通確認は起動時に `test_connection` を別途呼ぶ。
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!(
            "Creating PostgreSQL connection pool for host: {}:{}",
            config.host, config.port
        );

        let pool = Self::create_pool(config)?;

        Ok(Database { pool })
    }

    /// Deadpool 用の `Config` を組み立ててプールを生成する内部関数。
    /// `match` で SSL モードを切り替え、`native_tls` で TLS コネクタを差し込む。
    /// プール上限を超えた要求はキューに積まれ、`wait` タイムアウトが待ち時間の上限になる。
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        // Set connection parameters
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        // Configure SSL mode
        match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Disable);
            }
            "prefer" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Prefer);
            }
            "require" => {
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Require);
            }
            _ => {
                warn!("Unknown SSL mode '{}', defaulting to 'prefer'", config.ssl_mode);
                pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Prefer);
            }
        }

        // Configure connection pool
        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        // Create TLS connector for secure connections
        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    /// プールから接続を借りる小さなラッパー。
    /// `deadpool_postgres::Pool::get` が返す `PoolError` を `ApiError` に変換する。
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` を投げて DB が生きているか確認する。起動時に一度だけ呼ばれ、
    /// 失敗した場合はプロセスを立ち上げずに終了させる。
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            ApiError::Database(format!("Connection test failed: {}", e))
        })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// アプリ起動時に schools テーブルを CREATE する簡易マイグレーター。
    /// `IF NOT EXISTS` なので何度実行しても安全。
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let schools_table = r#"
            CREATE TABLE IF NOT EXISTS schools (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                address VARCHAR(255) NOT NULL,
                latitude DOUBLE PRECISION NOT NULL,
                longitude DOUBLE PRECISION NOT NULL
            )
        "#;

        client.execute(schools_table, &[]).await.map_err(|e| {
            error!("Failed to create schools table: {}", e);
            ApiError::Database(format!("Schools table creation failed: {}", e))
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    // School repository operations

    /// 学校レコードの INSERT。座標の範囲チェックは境界 (validation 層) で済んでいる
    /// 前提で、ここでは単一の文を実行するだけ。`RETURNING` で採番された id ごと
    /// 取り戻し、レスポンスへそのまま流せる `School` として返す。
    pub async fn insert_school(&self, school: NewSchool) -> Result<School, ApiError> {
        let client = self.get_connection().await?;

        let query = r#"
            INSERT INTO schools (name, address, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, latitude, longitude
        "#;

        let row = client
            .query_one(
                query,
                &[
                    &school.name,
                    &school.address,
                    &school.latitude,
                    &school.longitude,
                ],
            )
            .await
            .map_err(ApiError::from)?;

        let created = School {
            id: row.get(0),
            name: row.get(1),
            address: row.get(2),
            latitude: row.get(3),
            longitude: row.get(4),
        };

        info!("Created school with id: {}", created.id);
        Ok(created)
    }

    /// 基準点からの大圏距離 (km) を SQL 側で計算し、近い順に全件返す。
    /// ACOS の引数は基準点と行の座標が一致すると丸め誤差で ±1 をわずかに
    /// 超えることがあるため、LEAST / GREATEST で [-1, 1] に収めてから渡す。
    /// 距離が等しい行は id 昇順で並び、呼び出しごとに順序が変わらない。
    pub async fn list_schools_by_distance(
        &self,
        point: ReferencePoint,
    ) -> Result<Vec<SchoolWithDistance>, ApiError> {
        let client = self.get_connection().await?;

        let query = r#"
            SELECT
                id, name, address, latitude, longitude,
                (6371.0 * ACOS(LEAST(1.0, GREATEST(-1.0,
                    COS(RADIANS($1)) * COS(RADIANS(latitude)) * COS(RADIANS(longitude) - RADIANS($2)) +
                    SIN(RADIANS($1)) * SIN(RADIANS(latitude))
                )))) AS distance_km
            FROM schools
            ORDER BY distance_km ASC, id ASC
        "#;

        let rows = client
            .query(query, &[&point.latitude, &point.longitude])
            .await
            .map_err(ApiError::from)?;

        let schools: Vec<SchoolWithDistance> = rows
            .iter()
            .map(|row| SchoolWithDistance {
                id: row.get(0),
                name: row.get(1),
                address: row.get(2),
                latitude: row.get(3),
                longitude: row.get(4),
                distance_km: row.get(5),
            })
            .collect();

        Ok(schools)
    }
}
