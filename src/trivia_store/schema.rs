pub struct Table {
    pub name: &'static str,
    pub schema: &'static str,
    pub indices: &'static [&'static str],
}

const CATEGORY_TABLE_V_0: Table = Table {
    name: "category",
    schema: "CREATE TABLE category (id INTEGER UNIQUE, kind TEXT NOT NULL, created INTEGER DEFAULT (cast(strftime('%s','now') as int)), PRIMARY KEY (id));",
    indices: &[],
};
// question.category is a typed integer foreign key. The service this replaces
// stored it as text and compared it inconsistently across endpoints.
const QUESTION_TABLE_V_0: Table = Table {
    name: "question",
    schema: "CREATE TABLE question (id INTEGER UNIQUE, question TEXT NOT NULL, answer TEXT NOT NULL, category INTEGER NOT NULL, difficulty INTEGER NOT NULL, created INTEGER DEFAULT (cast(strftime('%s','now') as int)), PRIMARY KEY (id), CONSTRAINT category FOREIGN KEY (category) REFERENCES category (id) ON DELETE CASCADE);",
    indices: &["CREATE INDEX question_category_index ON question (category);"],
};

pub struct VersionedSchema {
    pub version: u32,
    pub tables: &'static [Table],
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[CATEGORY_TABLE_V_0, QUESTION_TABLE_V_0],
}];
