pub struct KnowledgeIndex;
