pub const CREATE_SUBSCRIBERS: &str = r#"
CREATE TABLE IF NOT EXISTS subscribers (
    id uuid PRIMARY KEY,
    name text NOT NULL,
    email text NOT NULL UNIQUE,
    created_at timestamptz NOT NULL DEFAULT NOW()
);
"#;

pub const CREATE_WATCHED_LOCATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS watched_locations (
    subscriber_id uuid NOT NULL REFERENCES subscribers (id) ON DELETE CASCADE,
    latitude float8 NOT NULL,
    longitude float8 NOT NULL,
    display_name text NOT NULL,
    last_notified_level text NOT NULL DEFAULT 'Low',
    position bigserial,
    PRIMARY KEY (subscriber_id, latitude, longitude)
);
"#;

pub const SELECT_ALL_SUBSCRIBER_LOCATIONS: &str = r#"
SELECT s.id AS subscriber_id, s.name, s.email,
       l.latitude, l.longitude, l.display_name, l.last_notified_level
FROM subscribers s
JOIN watched_locations l ON l.subscriber_id = s.id
ORDER BY s.created_at, s.email, l.position;
"#;

pub const SELECT_SUBSCRIBER_LOCATIONS_BY_EMAIL: &str = r#"
SELECT s.id AS subscriber_id, s.name, s.email,
       l.latitude, l.longitude, l.display_name, l.last_notified_level
FROM subscribers s
JOIN watched_locations l ON l.subscriber_id = s.id
WHERE s.email = $1
ORDER BY l.position;
"#;

pub const UPDATE_NOTIFIED_LEVEL: &str = r#"
UPDATE watched_locations
SET last_notified_level = $4
WHERE subscriber_id = $1 AND latitude = $2 AND longitude = $3;
"#;

pub const SELECT_SUBSCRIBER_BY_EMAIL: &str = r#"
SELECT id FROM subscribers WHERE email = $1 FOR UPDATE;
"#;

pub const INSERT_SUBSCRIBER: &str = r#"
INSERT INTO subscribers (id, name, email) VALUES ($1, $2, $3);
"#;

pub const INSERT_WATCHED_LOCATION: &str = r#"
INSERT INTO watched_locations (subscriber_id, latitude, longitude, display_name, last_notified_level)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (subscriber_id, latitude, longitude) DO NOTHING;
"#;

pub const DELETE_WATCHED_LOCATION: &str = r#"
DELETE FROM watched_locations
WHERE subscriber_id = $1 AND latitude = $2 AND longitude = $3;
"#;

pub const DELETE_SUBSCRIBER: &str = r#"
DELETE FROM subscribers WHERE id = $1;
"#;
