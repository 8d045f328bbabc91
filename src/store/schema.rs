use sqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), sqlite::Error> {
    conn.execute(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            id            TEXT PRIMARY KEY,
            display_name  TEXT NOT NULL,
            role          TEXT NOT NULL CHECK (role IN ('user', 'vendor', 'admin')),
            whatsapp      TEXT,
            created_at    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id            TEXT PRIMARY KEY,
            vendor_id     TEXT NOT NULL,
            name          TEXT NOT NULL,
            description   TEXT,
            category      TEXT NOT NULL,
            location      TEXT NOT NULL,
            price_from    INTEGER,
            price_to      INTEGER,
            price_unit    TEXT,
            status        TEXT NOT NULL DEFAULT 'pending'
                          CHECK (status IN ('pending', 'approved', 'rejected')),
            created_at    INTEGER NOT NULL,
            -- lowercased copies for text search
            name_folded         TEXT NOT NULL,
            description_folded  TEXT,
            category_folded     TEXT NOT NULL,
            location_folded     TEXT NOT NULL,
            FOREIGN KEY (vendor_id) REFERENCES profiles(id)
        );

        CREATE INDEX IF NOT EXISTS idx_products_status_created
            ON products (status, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_products_category_created
            ON products (category, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_products_vendor
            ON products (vendor_id);

        CREATE TABLE IF NOT EXISTS product_images (
            image_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id    TEXT NOT NULL,
            url           TEXT NOT NULL,
            position      INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_product_images_product
            ON product_images (product_id, position);

        CREATE TABLE IF NOT EXISTS favorites (
            user_id       TEXT NOT NULL,
            product_id    TEXT NOT NULL,
            created_at    INTEGER NOT NULL,
            PRIMARY KEY (user_id, product_id),
            FOREIGN KEY (user_id) REFERENCES profiles(id),
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS contact_logs (
            log_id        INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id    TEXT NOT NULL,
            vendor_id     TEXT NOT NULL,
            user_id       TEXT,
            contacted_at  INTEGER NOT NULL,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_contact_logs_vendor
            ON contact_logs (vendor_id, contacted_at DESC);

        CREATE TABLE IF NOT EXISTS app_settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}
