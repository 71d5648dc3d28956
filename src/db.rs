use anyhow::Context;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

pub async fn init_db(database_url: &str, max_connections: u32) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Creates the comp-off and leave tables if they do not exist yet.
pub async fn ensure_schema(pool: &MySqlPool) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS comp_off (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id BIGINT UNSIGNED NOT NULL,
            worked_date DATE NOT NULL,
            planned_leave_date DATE NULL,
            days DECIMAL(10,2) NOT NULL,
            status VARCHAR(16) NOT NULL,
            used_leave_application_id BIGINT UNSIGNED NULL,
            description VARCHAR(255) NULL,
            KEY idx_comp_off_fifo (employee_id, status, worked_date, id),
            KEY idx_comp_off_used_by (used_leave_application_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS leave_applications (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id BIGINT UNSIGNED NOT NULL,
            leave_type VARCHAR(16) NOT NULL,
            half_day_type VARCHAR(16) NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            days DECIMAL(10,2) NOT NULL,
            status VARCHAR(16) NOT NULL,
            loss_of_pay BOOLEAN NOT NULL DEFAULT FALSE,
            reason VARCHAR(500) NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            KEY idx_leave_employee (employee_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS leave_attachments (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            application_id BIGINT UNSIGNED NOT NULL,
            file_url VARCHAR(1024) NOT NULL,
            KEY idx_attachment_application (application_id)
        )
        "#,
    ];

    for sql in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .context("Failed to bootstrap schema")?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}
